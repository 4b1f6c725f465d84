//! An in-memory window and a fixed-pitch text measurer.
//!
//! `HeadlessWindow` behaves like an OS window for everything the core can
//! observe: it stores its extended style bits, color key, opacity and
//! geometry, and remembers the last scene it was asked to paint. It can be
//! told to fail its style calls to exercise the best-effort paths.

use super::{ExtendedStyle, PlatformWindow, Scene, TextMeasurer};
use crate::common::{Point, Rgb, Size};
use crate::components::layout::FontSpec;
use anyhow::bail;

#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    ex_style: ExtendedStyle,
    color_key: Option<Rgb>,
    background: Rgb,
    opacity: f64,
    topmost: bool,
    client_size: Size,
    position: Point,
    scene: Option<Scene>,
    fail_style_calls: bool,
    style_writes: usize,
    resizes: usize,
}

impl HeadlessWindow {
    pub fn new(client_size: Size, position: Point) -> Self {
        Self {
            ex_style: ExtendedStyle::TOOLWINDOW,
            color_key: None,
            background: Rgb::BLACK,
            opacity: 1.0,
            topmost: false,
            client_size,
            position,
            scene: None,
            fail_style_calls: false,
            style_writes: 0,
            resizes: 0,
        }
    }

    /// Makes every style read/write fail until switched back off.
    pub fn set_failing(&mut self, failing: bool) {
        self.fail_style_calls = failing;
    }

    /// Sets style bits directly, the way another component of the host
    /// application would.
    pub fn inject_style_bits(&mut self, bits: ExtendedStyle) {
        self.ex_style |= bits;
    }

    /// Simulates the user dragging the resize grip to a new size.
    pub fn user_resize(&mut self, size: Size) {
        self.client_size = size;
    }

    pub fn ex_style(&self) -> ExtendedStyle {
        self.ex_style
    }

    pub fn color_key(&self) -> Option<Rgb> {
        self.color_key
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_topmost(&self) -> bool {
        self.topmost
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Number of successful extended-style writes.
    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    /// Number of programmatic client-size changes.
    pub fn resizes(&self) -> usize {
        self.resizes
    }

    fn check_style_call(&self, what: &str) -> anyhow::Result<()> {
        if self.fail_style_calls {
            bail!("{what} failed: window style calls are disabled");
        }
        Ok(())
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new(Size::new(343, 160), Point::new(0, 0))
    }
}

impl PlatformWindow for HeadlessWindow {
    fn extended_style(&self) -> anyhow::Result<ExtendedStyle> {
        self.check_style_call("reading the extended style")?;
        Ok(self.ex_style)
    }

    fn set_extended_style(&mut self, style: ExtendedStyle) -> anyhow::Result<()> {
        self.check_style_call("writing the extended style")?;
        self.ex_style = style;
        self.style_writes += 1;
        Ok(())
    }

    fn set_color_key(&mut self, key: Option<Rgb>) -> anyhow::Result<()> {
        self.check_style_call("setting the color key")?;
        if key.is_some() {
            self.ex_style |= ExtendedStyle::LAYERED;
        }
        self.color_key = key;
        Ok(())
    }

    fn set_background(&mut self, color: Rgb) -> anyhow::Result<()> {
        self.check_style_call("painting the background")?;
        self.background = color;
        Ok(())
    }

    fn set_opacity(&mut self, fraction: f64) -> anyhow::Result<()> {
        self.check_style_call("setting the opacity")?;
        self.ex_style |= ExtendedStyle::LAYERED;
        self.opacity = fraction;
        Ok(())
    }

    fn set_topmost(&mut self, topmost: bool) -> anyhow::Result<()> {
        self.check_style_call("changing the z-order")?;
        self.topmost = topmost;
        self.ex_style = if topmost {
            self.ex_style | ExtendedStyle::TOPMOST
        } else {
            self.ex_style.without(ExtendedStyle::TOPMOST)
        };
        Ok(())
    }

    fn client_size(&self) -> Size {
        self.client_size
    }

    fn set_client_size(&mut self, size: Size) -> anyhow::Result<()> {
        self.client_size = size;
        self.resizes += 1;
        Ok(())
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) -> anyhow::Result<()> {
        self.position = position;
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.scene = Some(scene.clone());
        Ok(())
    }
}

/// Treats every ASCII character as 0.6 em wide and everything else as a
/// full-width 1.2 em; line height is 1.5 em.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasurer;

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Size {
        let tenths: u32 = text
            .chars()
            .map(|c| if c.is_ascii() { 6 } else { 12 })
            .sum();
        Size::new(
            (tenths as f32 * font.size / 10.0).ceil() as i32,
            (font.size * 1.5).ceil() as i32,
        )
    }
}
