//! The capability seam between the core and the operating system.
//!
//! The core only ever talks to a window through [`PlatformWindow`] and only
//! ever measures text through [`TextMeasurer`]. Two implementations ship with
//! the crate:
//!
//! - [`headless`]: an in-memory window and a monospace measurer, used by the
//!   shell and the tests.
//! - `win32` (Windows only): a layered `HWND` driven through the `windows`
//!   crate.

pub mod headless;
#[cfg(windows)]
pub mod win32;

use crate::common::{Point, Rect, Rgb, Size};
use crate::components::layout::FontSpec;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Extended window style bits, using the Win32 `WS_EX_*` values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExtendedStyle(pub u32);

impl ExtendedStyle {
    pub const TOPMOST: Self = Self(0x0000_0008);
    /// Input-transparent: pointer input passes through to whatever is beneath.
    pub const TRANSPARENT: Self = Self(0x0000_0020);
    pub const TOOLWINDOW: Self = Self(0x0000_0080);
    pub const LAYERED: Self = Self(0x0008_0000);
    pub const NOACTIVATE: Self = Self(0x0800_0000);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for ExtendedStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for ExtendedStyle {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl fmt::Debug for ExtendedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedStyle({:#010x})", self.0)
    }
}

/// One positioned text element.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScene {
    pub text: String,
    pub font: FontSpec,
    pub bounds: Rect,
}

/// Everything a window needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub title: LabelScene,
    pub time: LabelScene,
    pub text_color: Rgb,
}

/// The window operations the core depends on.
///
/// Every method is best-effort: callers log a failure and carry on with their
/// logical state.
pub trait PlatformWindow {
    /// Reads the window's current extended style from the OS.
    fn extended_style(&self) -> anyhow::Result<ExtendedStyle>;

    /// Writes the window's extended style.
    fn set_extended_style(&mut self, style: ExtendedStyle) -> anyhow::Result<()>;

    /// Turns input transparency on or off.
    ///
    /// Reads the live style immediately before writing and only touches the
    /// bits owned by this call. Enabling sets `TRANSPARENT | LAYERED`;
    /// disabling clears `TRANSPARENT` and leaves `LAYERED` in place.
    fn set_click_through(&mut self, enabled: bool) -> anyhow::Result<()> {
        let current = self.extended_style()?;
        let next = if enabled {
            current | ExtendedStyle::TRANSPARENT | ExtendedStyle::LAYERED
        } else {
            current.without(ExtendedStyle::TRANSPARENT)
        };
        if next != current {
            self.set_extended_style(next)?;
        }
        Ok(())
    }

    /// Registers (or clears, with `None`) the color rendered fully transparent.
    fn set_color_key(&mut self, key: Option<Rgb>) -> anyhow::Result<()>;

    fn set_background(&mut self, color: Rgb) -> anyhow::Result<()>;

    /// Whole-window alpha in `[0, 1]`.
    fn set_opacity(&mut self, fraction: f64) -> anyhow::Result<()>;

    fn set_topmost(&mut self, topmost: bool) -> anyhow::Result<()>;

    fn client_size(&self) -> Size;

    fn set_client_size(&mut self, size: Size) -> anyhow::Result<()>;

    /// Screen position of the window's top-left corner.
    fn position(&self) -> Point;

    fn set_position(&mut self, position: Point) -> anyhow::Result<()>;

    /// Hands the laid-out labels to the window for painting.
    fn present(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

/// Measures the rendered extent of a string in a given font.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Size;
}
