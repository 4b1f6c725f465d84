//! Window attributes driven by user intent: click-through, color-key
//! transparency, opacity and topmost.

use crate::common::Rgb;
use crate::config::StyleConfig;
use crate::platform::PlatformWindow;
use tracing::{debug, warn};

/// The recorded user intent for every window attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStyleState {
    pub dragging_enabled: bool,
    pub color_key_transparency_enabled: bool,
    pub always_on_top: bool,
    /// Whole-window alpha in `[0, 1]`.
    pub opacity: f64,
}

impl WindowStyleState {
    /// Click-through is active exactly when dragging is disabled.
    pub fn click_through_active(&self) -> bool {
        !self.dragging_enabled
    }
}

impl Default for WindowStyleState {
    fn default() -> Self {
        Self {
            dragging_enabled: true,
            color_key_transparency_enabled: false,
            always_on_top: true,
            opacity: 0.75,
        }
    }
}

/// Names a window attribute whose platform call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleAttribute {
    ClickThrough,
    ColorKey,
    Opacity,
    Topmost,
}

/// Records intents and pushes them to the window.
///
/// Every setter records the new state before touching the window, so a
/// failing platform call leaves the logical state correct and the next
/// successful call catches the window up.
pub struct WindowStyleManager {
    state: WindowStyleState,
    config: StyleConfig,
}

impl WindowStyleManager {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            state: WindowStyleState::default(),
            config,
        }
    }

    pub fn state(&self) -> &WindowStyleState {
        &self.state
    }

    pub fn set_dragging_enabled(
        &mut self,
        enabled: bool,
        window: &mut dyn PlatformWindow,
    ) -> Result<(), StyleAttribute> {
        self.state.dragging_enabled = enabled;
        debug!("Dragging {}; click-through {}.", on_off(enabled), on_off(!enabled));
        report(
            StyleAttribute::ClickThrough,
            window.set_click_through(self.state.click_through_active()),
        )
    }

    pub fn set_color_key_transparency_enabled(
        &mut self,
        enabled: bool,
        window: &mut dyn PlatformWindow,
    ) -> Result<(), StyleAttribute> {
        self.state.color_key_transparency_enabled = enabled;
        debug!("Color-key transparency {}.", on_off(enabled));
        let (background, key) = self.color_key_colors();
        let result = window
            .set_background(background)
            .and_then(|()| window.set_color_key(key));
        report(StyleAttribute::ColorKey, result)
    }

    /// Clamps `fraction` into `[0, 1]`.
    pub fn set_opacity(&mut self, fraction: f64, window: &mut dyn PlatformWindow) -> Result<(), StyleAttribute> {
        let fraction = if fraction.is_nan() { 1.0 } else { fraction.clamp(0.0, 1.0) };
        self.state.opacity = fraction;
        debug!("Opacity {:.2}.", fraction);
        report(StyleAttribute::Opacity, window.set_opacity(fraction))
    }

    pub fn set_always_on_top(&mut self, on_top: bool, window: &mut dyn PlatformWindow) -> Result<(), StyleAttribute> {
        self.state.always_on_top = on_top;
        debug!("Always on top {}.", on_off(on_top));
        report(StyleAttribute::Topmost, window.set_topmost(on_top))
    }

    /// Pushes every recorded intent to the window. Returns the attributes
    /// whose platform call failed.
    pub fn apply_all(&mut self, window: &mut dyn PlatformWindow) -> Vec<StyleAttribute> {
        let state = self.state.clone();
        [
            self.set_dragging_enabled(state.dragging_enabled, window),
            self.set_color_key_transparency_enabled(state.color_key_transparency_enabled, window),
            self.set_opacity(state.opacity, window),
            self.set_always_on_top(state.always_on_top, window),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    /// Restores the default intents and applies them.
    pub fn reset(&mut self, window: &mut dyn PlatformWindow) -> Vec<StyleAttribute> {
        self.state = WindowStyleState::default();
        self.apply_all(window)
    }

    /// The background fill and color key for the current transparency intent.
    fn color_key_colors(&self) -> (Rgb, Option<Rgb>) {
        if self.state.color_key_transparency_enabled {
            (self.config.color_key, Some(self.config.color_key))
        } else {
            (self.config.background, None)
        }
    }
}

fn report(attribute: StyleAttribute, result: anyhow::Result<()>) -> Result<(), StyleAttribute> {
    result.map_err(|e| {
        warn!("Applying {:?} failed; keeping the requested state: {:#}", attribute, e);
        attribute
    })
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
