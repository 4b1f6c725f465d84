//! Text formatting for the two labels.
//!
//! Every function takes the `LocaleConfig` explicitly instead of reading a
//! process-wide culture setting.

use crate::config::{Language, LocaleConfig};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use std::fmt::Write;
use tracing::warn;

/// What a countdown shows once it has run out.
pub const ZERO_DURATION: &str = "00:00:00";

/// Formats the live clock, `HH:mm:ss` by default.
pub fn clock_text(now: NaiveDateTime, locale: &LocaleConfig) -> String {
    format_or_default(now, &locale.clock_format, "%H:%M:%S")
}

/// Renders `now` with `format`, falling back to `fallback` when `format`
/// holds a specifier `chrono` cannot render.
fn format_or_default(now: NaiveDateTime, format: &str, fallback: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", now.format(format)).is_ok() {
        return text;
    }
    warn!("Cannot render the format '{}'; using '{}'.", format, fallback);
    now.format(fallback).to_string()
}

/// Formats a remaining duration as `hh:mm:ss`.
///
/// Hours are not wrapped at 24, fractional seconds are truncated and negative
/// durations render as zero.
pub fn duration_text(remaining: TimeDelta) -> String {
    seconds_text(remaining.num_seconds())
}

/// Formats a whole number of seconds as `hh:mm:ss`.
pub fn seconds_text(total_secs: i64) -> String {
    let total = total_secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// The AM/PM designator for the given language.
pub fn meridiem(now: NaiveDateTime, language: Language) -> &'static str {
    let morning = now.hour() < 12;
    match (language, morning) {
        (Language::Japanese, true) => "午前",
        (Language::Japanese, false) => "午後",
        (Language::English, true) => "AM",
        (Language::English, false) => "PM",
    }
}

/// The default title: the date followed by the AM/PM designator, e.g. `10/18/午後`.
pub fn date_title(now: NaiveDateTime, locale: &LocaleConfig) -> String {
    format!(
        "{}/{}",
        format_or_default(now, &locale.date_format, "%m/%d"),
        meridiem(now, locale.language)
    )
}
