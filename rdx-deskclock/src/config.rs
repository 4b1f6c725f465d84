//! Defines all configuration structures for the desk clock core.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. They hold tuning constants only: the tick
//! speed, the locale used for formatting, and the layout and style constants.
//! User-facing state (mode, opacity, fonts) always starts at the hard-coded
//! defaults and is never written back.

use crate::common::Rgb;
use anyhow::{bail, Context};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The top-level configuration for the `DeskClockEngine`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeskClockConfig {
    /// The tick speed of the `SystemClock`.
    #[serde(default)]
    pub resolution: ClockResolution,

    /// Locale used for the time and date strings.
    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub style: StyleConfig,
}

impl DeskClockConfig {
    /// Loads the configuration from an optional TOML file, then applies
    /// `DESKCLOCK_*` environment overrides (e.g. `DESKCLOCK_LAYOUT__MARGIN=24`).
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("DESKCLOCK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate().context("invalid desk clock configuration")?;
        Ok(config)
    }

    /// Rejects values the core cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let ClockResolution::Custom { ticks_per_second } = self.resolution {
            if ticks_per_second == 0 || ticks_per_second > MAX_TICKS_PER_SECOND {
                bail!(
                    "resolution.ticks_per_second must be between 1 and {}, got {}",
                    MAX_TICKS_PER_SECOND,
                    ticks_per_second
                );
            }
        }
        check_format("locale.clock_format", &self.locale.clock_format)?;
        check_format("locale.date_format", &self.locale.date_format)?;

        let layout = &self.layout;
        if layout.margin < 0 {
            bail!("layout.margin must not be negative, got {}", layout.margin);
        }
        if !(layout.min_font_size.is_finite() && layout.min_font_size > 0.0) {
            bail!("layout.min_font_size must be positive, got {}", layout.min_font_size);
        }
        if layout.grip_size < 0 {
            bail!("layout.grip_size must not be negative, got {}", layout.grip_size);
        }
        Ok(())
    }
}

/// Fails on any specifier `chrono` cannot render.
fn check_format(field: &str, format: &str) -> anyhow::Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        bail!("{} is not a valid format string: '{}'", field, format);
    }
    Ok(())
}

/// Upper bound for `ClockResolution::Custom`; keeps the tick period at 1 ms or more.
pub const MAX_TICKS_PER_SECOND: u64 = 1_000;

/// Defines the operational speed of the `SystemClock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// 1 tick per second. What the widget runs at.
    #[default]
    Low,
    /// A user-defined speed in ticks per second, for fast-forward demos.
    Custom { ticks_per_second: u64 },
}

impl ClockResolution {
    /// The wall-clock period between two ticks.
    pub fn period(&self) -> Duration {
        match self {
            ClockResolution::Low => Duration::from_secs(1),
            ClockResolution::Custom { ticks_per_second } => {
                let ticks = u32::try_from(*ticks_per_second).unwrap_or(u32::MAX);
                Duration::from_secs(1) / ticks.clamp(1, MAX_TICKS_PER_SECOND as u32)
            }
        }
    }
}

/// Display language. Only affects the AM/PM designator in the date title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Japanese,
    English,
}

/// Explicit format configuration handed to every formatting call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocaleConfig {
    #[serde(default)]
    pub language: Language,
    /// `chrono` format string for the live clock.
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
    /// `chrono` format string for the date part of the title.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            clock_format: default_clock_format(),
            date_format: default_date_format(),
        }
    }
}

/// Constants used by the `LayoutEngine` and the `DragController`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutConfig {
    /// Total padding added to the fitted content, split evenly on each side.
    #[serde(default = "default_margin")]
    pub margin: i32,
    /// Resize-driven scaling never shrinks a font below this size.
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,
    /// Edge length of the square resize grip in the bottom-right corner.
    #[serde(default = "default_grip_size")]
    pub grip_size: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            min_font_size: default_min_font_size(),
            grip_size: default_grip_size(),
        }
    }
}

/// Colors used by the `WindowStyleManager`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleConfig {
    /// Sentinel painted as the background and registered as the color key
    /// while color-key transparency is on.
    #[serde(default = "default_color_key")]
    pub color_key: Rgb,
    /// Opaque background used while color-key transparency is off.
    #[serde(default = "default_background")]
    pub background: Rgb,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color_key: default_color_key(),
            background: default_background(),
        }
    }
}

// --- Default value functions for serde ---

fn default_clock_format() -> String {
    "%H:%M:%S".to_string()
}

fn default_date_format() -> String {
    "%m/%d".to_string()
}

fn default_margin() -> i32 {
    40
}

fn default_min_font_size() -> f32 {
    8.0
}

fn default_grip_size() -> i32 {
    16
}

fn default_color_key() -> Rgb {
    Rgb::MAGENTA
}

fn default_background() -> Rgb {
    Rgb::BLACK
}
