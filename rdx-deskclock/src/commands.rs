//! The commands collaborators issue into the core, and their text form.
//!
//! Parsing is the command boundary: durations, times and percentages are
//! validated here so that the engine only ever sees sensible values. The
//! engine clamps again on its side.

use crate::common::Rgb;
use crate::components::layout::{FontRole, FontSpec};
use crate::config::Language;
use chrono::NaiveTime;
use std::str::FromStr;
use thiserror::Error;

/// Longest countdown the collaborator layer offers, in minutes.
pub const MAX_COUNTDOWN_MINUTES: i64 = 1440;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ShowClock,
    StartCountdown { seconds: i64 },
    StartTarget { time_of_day: NaiveTime },
    /// Whole-window opacity in percent, `0..=100`.
    SetOpacity { percent: u8 },
    SetAlwaysOnTop(bool),
    SetDraggingEnabled(bool),
    SetTransparencyEnabled(bool),
    SetTextColor(Rgb),
    SetFont { role: FontRole, font: FontSpec },
    SetTitleText(String),
    SetLanguage(Language),
    ResetToDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("countdown must be between 1 second and {MAX_COUNTDOWN_MINUTES} minutes, got '{0}'")]
    InvalidDuration(String),
    #[error("'{0}' is not a time of day (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),
    #[error("opacity must be a percentage between 0 and 100, got '{0}'")]
    InvalidPercent(String),
    #[error("'{0}' is not a color (expected #RRGGBB)")]
    InvalidColor(String),
    #[error("'{0}' is not a font size")]
    InvalidFontSize(String),
    #[error("expected 'on' or 'off', got '{0}'")]
    InvalidSwitch(String),
    #[error("unknown language '{0}' (expected 'ja' or 'en')")]
    InvalidLanguage(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match word {
            "clock" => Ok(Command::ShowClock),
            "countdown" => {
                let arg = single(&args, "countdown <MINUTES> | countdown <N>m | countdown <N>s")?;
                Ok(Command::StartCountdown {
                    seconds: parse_duration(arg)?,
                })
            }
            "target" => {
                let arg = single(&args, "target <HH:MM[:SS]>")?;
                Ok(Command::StartTarget {
                    time_of_day: parse_time(arg)?,
                })
            }
            "opacity" => {
                let arg = single(&args, "opacity <0-100>")?;
                let percent = arg
                    .trim_end_matches('%')
                    .parse::<u8>()
                    .ok()
                    .filter(|p| *p <= 100)
                    .ok_or_else(|| CommandError::InvalidPercent(arg.to_string()))?;
                Ok(Command::SetOpacity { percent })
            }
            "topmost" => Ok(Command::SetAlwaysOnTop(parse_switch(single(&args, "topmost on|off")?)?)),
            "drag" => Ok(Command::SetDraggingEnabled(parse_switch(single(&args, "drag on|off")?)?)),
            "transparency" => Ok(Command::SetTransparencyEnabled(parse_switch(single(
                &args,
                "transparency on|off",
            )?)?)),
            "color" => {
                let arg = single(&args, "color <#RRGGBB>")?;
                let color = Rgb::parse_hex(arg).ok_or_else(|| CommandError::InvalidColor(arg.to_string()))?;
                Ok(Command::SetTextColor(color))
            }
            "font" => parse_font(&args),
            "title" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("title <TEXT>"));
                }
                Ok(Command::SetTitleText(rest.to_string()))
            }
            "lang" => {
                let arg = single(&args, "lang ja|en")?;
                let language = match arg {
                    "ja" | "japanese" => Language::Japanese,
                    "en" | "english" => Language::English,
                    other => return Err(CommandError::InvalidLanguage(other.to_string())),
                };
                Ok(Command::SetLanguage(language))
            }
            "reset" => Ok(Command::ResetToDefaults),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn single<'a>(args: &[&'a str], usage: &'static str) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// A bare number is minutes; `s` and `m` suffixes are explicit.
fn parse_duration(arg: &str) -> Result<i64, CommandError> {
    let invalid = || CommandError::InvalidDuration(arg.to_string());
    let seconds = if let Some(secs) = arg.strip_suffix('s') {
        secs.parse::<i64>().map_err(|_| invalid())?
    } else {
        let minutes = arg.strip_suffix('m').unwrap_or(arg);
        minutes.parse::<i64>().map_err(|_| invalid())?.saturating_mul(60)
    };
    if seconds <= 0 || seconds > MAX_COUNTDOWN_MINUTES * 60 {
        return Err(invalid());
    }
    Ok(seconds)
}

fn parse_time(arg: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(arg, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(arg, "%H:%M"))
        .map_err(|_| CommandError::InvalidTime(arg.to_string()))
}

fn parse_switch(arg: &str) -> Result<bool, CommandError> {
    match arg {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(CommandError::InvalidSwitch(other.to_string())),
    }
}

fn parse_font(args: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "font title|time <SIZE> [FAMILY...]";
    let [role, size, family @ ..] = args else {
        return Err(CommandError::Usage(USAGE));
    };
    let role = match *role {
        "title" => FontRole::Title,
        "time" => FontRole::Time,
        _ => return Err(CommandError::Usage(USAGE)),
    };
    let size = size
        .parse::<f32>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or_else(|| CommandError::InvalidFontSize(size.to_string()))?;
    let family = if family.is_empty() {
        FontSpec::default_title().family
    } else {
        family.join(" ")
    };
    Ok(Command::SetFont {
        role,
        font: FontSpec::new(family, size),
    })
}
