//! Centering, auto-sizing and proportional font scaling for the two labels.
//!
//! Two kinds of change reach this engine and they are kept strictly apart:
//!
//! - Explicit edits (a font pick, a new title, a language switch) resize the
//!   window to fit and are followed by [`LayoutEngine::rebaseline`].
//! - An interactive resize scales the fonts from the baseline captured by the
//!   last explicit edit and never moves that baseline.
//!
//! Because scaling always starts from the same reference point, repeated
//! resize passes cannot compound, and because auto-sizing is suspended while
//! the grip is held, the engine never resizes the window under the user's
//! pointer.

use crate::common::{Point, Rect, Size};
use crate::config::LayoutConfig;
use crate::platform::{PlatformWindow, TextMeasurer};
use tracing::{debug, warn};

/// Which of the two labels a font applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Time,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    /// Size in points.
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn default_title() -> Self {
        Self::new("Segoe UI", 24.0)
    }

    pub fn default_time() -> Self {
        Self::new("Segoe UI", 48.0)
    }
}

/// Where the two labels were placed by the last layout pass, in client
/// coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub title: Rect,
    pub time: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub baseline_client_size: Size,
    pub baseline_title_font_size: f32,
    pub baseline_time_font_size: f32,
    /// Set while the user holds the resize grip.
    pub interactive_resize_in_progress: bool,
    pub title_font: FontSpec,
    pub time_font: FontSpec,
}

pub struct LayoutEngine {
    state: LayoutState,
    config: LayoutConfig,
    placement: Placement,
}

impl LayoutEngine {
    /// Creates an engine whose baseline is the given fonts at `client_size`.
    pub fn new(config: LayoutConfig, title_font: FontSpec, time_font: FontSpec, client_size: Size) -> Self {
        let mut engine = Self {
            state: LayoutState {
                baseline_client_size: client_size,
                baseline_title_font_size: 0.0,
                baseline_time_font_size: 0.0,
                interactive_resize_in_progress: false,
                title_font,
                time_font,
            },
            config,
            placement: Placement::default(),
        };
        engine.state.title_font.size = engine.floor(engine.state.title_font.size);
        engine.state.time_font.size = engine.floor(engine.state.time_font.size);
        engine.state.baseline_title_font_size = engine.state.title_font.size;
        engine.state.baseline_time_font_size = engine.state.time_font.size;
        engine
    }

    /// Recomputes label positions and, unless the grip is held, fits the
    /// window to the labels plus the margin.
    ///
    /// Idempotent: a second call with the same text and fonts changes nothing.
    pub fn on_content_changed(
        &mut self,
        title: &str,
        time: &str,
        window: &mut dyn PlatformWindow,
        measurer: &dyn TextMeasurer,
    ) -> Placement {
        let title_size = measurer.measure(title, &self.state.title_font);
        let time_size = measurer.measure(time, &self.state.time_font);
        let mut client = window.client_size();

        if !self.state.interactive_resize_in_progress {
            let fitted = self.fitted_size(title_size, time_size);
            if fitted != client {
                match window.set_client_size(fitted) {
                    Ok(()) => {
                        debug!("Client area fitted from {:?} to {:?}.", client, fitted);
                        client = window.client_size();
                    }
                    Err(e) => warn!("Could not resize the window to {:?}: {:#}", fitted, e),
                }
            }
        }

        self.placement = center(client, title_size, time_size);
        self.placement
    }

    /// Marks the start of a grip drag. Auto-sizing is suspended until
    /// [`on_interactive_resize_end`](Self::on_interactive_resize_end).
    pub fn begin_interactive_resize(&mut self) {
        self.state.interactive_resize_in_progress = true;
    }

    /// Scales both fonts from the baseline by
    /// `min(width ratio, height ratio)` of the current client size.
    pub fn on_interactive_resize_tick(
        &mut self,
        title: &str,
        time: &str,
        window: &mut dyn PlatformWindow,
        measurer: &dyn TextMeasurer,
    ) -> Placement {
        self.state.interactive_resize_in_progress = true;
        let scale = self.scale_for(window.client_size());
        self.state.title_font.size = self.floor(self.state.baseline_title_font_size * scale);
        self.state.time_font.size = self.floor(self.state.baseline_time_font_size * scale);
        debug!(
            "Resize scale {:.3}: title {:.1}pt, time {:.1}pt.",
            scale, self.state.title_font.size, self.state.time_font.size
        );
        self.on_content_changed(title, time, window, measurer)
    }

    /// Ends the grip drag and lets the window settle around the scaled text.
    pub fn on_interactive_resize_end(
        &mut self,
        title: &str,
        time: &str,
        window: &mut dyn PlatformWindow,
        measurer: &dyn TextMeasurer,
    ) -> Placement {
        self.state.interactive_resize_in_progress = false;
        self.on_content_changed(title, time, window, measurer)
    }

    /// Captures the current client size and font sizes as the reference for
    /// future proportional scaling.
    pub fn rebaseline(&mut self, window: &dyn PlatformWindow) {
        self.state.baseline_client_size = window.client_size();
        self.state.baseline_title_font_size = self.state.title_font.size;
        self.state.baseline_time_font_size = self.state.time_font.size;
        debug!(
            "Rebaselined at {:?} with title {:.1}pt, time {:.1}pt.",
            self.state.baseline_client_size,
            self.state.baseline_title_font_size,
            self.state.baseline_time_font_size
        );
    }

    /// Replaces the font for one label, flooring its size.
    pub fn set_font(&mut self, role: FontRole, mut font: FontSpec) {
        font.size = self.floor(font.size);
        match role {
            FontRole::Title => self.state.title_font = font,
            FontRole::Time => self.state.time_font = font,
        }
    }

    pub fn font(&self, role: FontRole) -> &FontSpec {
        match role {
            FontRole::Title => &self.state.title_font,
            FontRole::Time => &self.state.time_font,
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn fitted_size(&self, title: Size, time: Size) -> Size {
        Size::new(
            title.width.max(time.width) + self.config.margin,
            title.height + time.height + self.config.margin,
        )
    }

    fn scale_for(&self, client: Size) -> f32 {
        let base = self.state.baseline_client_size;
        if base.is_empty() {
            return 1.0;
        }
        let sx = client.width as f32 / base.width as f32;
        let sy = client.height as f32 / base.height as f32;
        sx.min(sy)
    }

    fn floor(&self, size: f32) -> f32 {
        size.max(self.config.min_font_size)
    }
}

/// Centers both labels horizontally and the pair, stacked with no gap,
/// vertically.
fn center(client: Size, title: Size, time: Size) -> Placement {
    let title_x = (client.width - title.width) / 2;
    let time_x = (client.width - time.width) / 2;
    let title_y = (client.height - title.height - time.height) / 2;
    Placement {
        title: Rect::new(Point::new(title_x, title_y), title),
        time: Rect::new(Point::new(time_x, title_y + title.height), time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{HeadlessWindow, MonospaceMeasurer};

    fn engine(window: &HeadlessWindow) -> LayoutEngine {
        LayoutEngine::new(
            LayoutConfig::default(),
            FontSpec::new("Segoe UI", 10.0),
            FontSpec::new("Segoe UI", 20.0),
            window.client_size(),
        )
    }

    #[test]
    fn content_pass_fits_and_centers() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        // "10/18" -> 30x15 at 10pt, "12:00:00" -> 96x30 at 20pt.
        let placement = layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        assert_eq!(window.client_size(), Size::new(136, 85));
        assert_eq!(placement.title, Rect::new(Point::new(53, 20), Size::new(30, 15)));
        assert_eq!(placement.time, Rect::new(Point::new(20, 35), Size::new(96, 30)));
    }

    #[test]
    fn content_pass_is_idempotent() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        let first = layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        let second = layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        assert_eq!(first, second);
        assert_eq!(window.resizes(), 1);
    }

    #[test]
    fn resize_gesture_suppresses_auto_size() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        layout.rebaseline(&window);
        layout.begin_interactive_resize();
        window.user_resize(Size::new(300, 300));
        layout.on_content_changed("10/18", "12:00:01", &mut window, &MonospaceMeasurer);
        assert_eq!(window.client_size(), Size::new(300, 300));
    }

    #[test]
    fn resize_scales_by_the_smaller_ratio_without_rebaselining() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        layout.rebaseline(&window);
        let baseline = layout.state().baseline_client_size;

        window.user_resize(Size::new(baseline.width * 3, baseline.height * 2));
        layout.on_interactive_resize_tick("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        assert_eq!(layout.font(FontRole::Title).size, 20.0);
        assert_eq!(layout.font(FontRole::Time).size, 40.0);
        assert_eq!(layout.state().baseline_client_size, baseline);
        assert_eq!(layout.state().baseline_title_font_size, 10.0);
    }

    #[test]
    fn resize_floors_fonts_at_minimum() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        layout.rebaseline(&window);
        window.user_resize(Size::new(10, 10));
        layout.on_interactive_resize_tick("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        assert_eq!(layout.font(FontRole::Title).size, 8.0);
        assert_eq!(layout.font(FontRole::Time).size, 8.0);
    }

    #[test]
    fn resize_end_settles_the_window_around_scaled_text() {
        let mut window = HeadlessWindow::default();
        let mut layout = engine(&window);
        layout.on_content_changed("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        layout.rebaseline(&window);
        let baseline = window.client_size();
        layout.begin_interactive_resize();
        window.user_resize(Size::new(baseline.width * 2, baseline.height * 2 + 7));
        layout.on_interactive_resize_tick("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        layout.on_interactive_resize_end("10/18", "12:00:00", &mut window, &MonospaceMeasurer);
        assert!(!layout.state().interactive_resize_in_progress);
        // 60x30 title, 192x60 time at double size.
        assert_eq!(window.client_size(), Size::new(232, 130));
    }

    #[test]
    fn set_font_floors_size() {
        let window = HeadlessWindow::default();
        let mut layout = engine(&window);
        layout.set_font(FontRole::Title, FontSpec::new("Meiryo", 2.0));
        assert_eq!(layout.font(FontRole::Title).family, "Meiryo");
        assert_eq!(layout.font(FontRole::Title).size, 8.0);
    }

    #[test]
    fn zero_baseline_disables_scaling() {
        let mut window = HeadlessWindow::new(Size::new(0, 0), Point::default());
        let mut layout = engine(&window);
        window.user_resize(Size::new(500, 500));
        layout.on_interactive_resize_tick("a", "b", &mut window, &MonospaceMeasurer);
        assert_eq!(layout.font(FontRole::Time).size, 20.0);
    }
}
