//! Tests for fitting, centering and proportional font scaling.

use deskclock::common::{Point, Size};
use deskclock::components::layout::{FontRole, FontSpec, LayoutEngine};
use deskclock::config::LayoutConfig;
use deskclock::platform::headless::{HeadlessWindow, MonospaceMeasurer};
use deskclock::platform::PlatformWindow;
use proptest::prelude::*;

const TITLE: &str = "10/18/PM";
const TIME: &str = "14:00:00";

fn fitted(title_size: f32, time_size: f32) -> (LayoutEngine, HeadlessWindow) {
    let mut window = HeadlessWindow::default();
    let mut layout = LayoutEngine::new(
        LayoutConfig::default(),
        FontSpec::new("Segoe UI", title_size),
        FontSpec::new("Segoe UI", time_size),
        window.client_size(),
    );
    layout.on_content_changed(TITLE, TIME, &mut window, &MonospaceMeasurer);
    layout.rebaseline(&window);
    (layout, window)
}

#[test]
fn scaling_twice_then_back_restores_baseline_fonts() {
    let (mut layout, mut window) = fitted(24.0, 30.0);
    let base = window.client_size();
    layout.begin_interactive_resize();

    window.user_resize(Size::new(base.width * 2, base.height * 2));
    layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
    assert_eq!(layout.font(FontRole::Title).size, 48.0);
    assert_eq!(layout.font(FontRole::Time).size, 60.0);
    // Auto-size stays off while the grip is held.
    assert_eq!(window.client_size(), Size::new(base.width * 2, base.height * 2));

    window.user_resize(base);
    layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
    assert_eq!(layout.font(FontRole::Title).size, 24.0);
    assert_eq!(layout.font(FontRole::Time).size, 30.0);

    window.user_resize(Size::new(base.width * 2, base.height * 2));
    layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
    assert_eq!(layout.font(FontRole::Time).size, 60.0);
    assert_eq!(layout.state().baseline_client_size, base);
    assert_eq!(layout.state().baseline_time_font_size, 30.0);
}

#[test]
fn narrow_drag_scales_by_width() {
    let (mut layout, mut window) = fitted(20.0, 40.0);
    let base = window.client_size();
    window.user_resize(Size::new(base.width / 2, base.height * 3));
    layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
    let expected = 40.0 * ((base.width / 2) as f32 / base.width as f32);
    assert_eq!(layout.font(FontRole::Time).size, expected);
}

#[test]
fn labels_are_centered_and_stacked() {
    let (layout, window) = fitted(10.0, 20.0);
    let client = window.client_size();
    let placement = layout.placement();
    assert_eq!(placement.time.origin.x, (client.width - placement.time.size.width) / 2);
    assert_eq!(placement.title.origin.x, (client.width - placement.title.size.width) / 2);
    assert_eq!(placement.time.origin.y, placement.title.bottom());
    assert_eq!(placement.title.origin, Point::new(44, 20));
}

#[test]
fn explicit_edit_after_resize_becomes_the_new_baseline() {
    let (mut layout, mut window) = fitted(24.0, 30.0);
    let base = window.client_size();
    layout.begin_interactive_resize();
    window.user_resize(Size::new(base.width * 2, base.height * 2));
    layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
    layout.on_interactive_resize_end(TITLE, TIME, &mut window, &MonospaceMeasurer);

    layout.set_font(FontRole::Title, FontSpec::new("Meiryo", 12.0));
    layout.on_content_changed(TITLE, TIME, &mut window, &MonospaceMeasurer);
    layout.rebaseline(&window);
    assert_eq!(layout.state().baseline_title_font_size, 12.0);
    assert_eq!(layout.state().baseline_time_font_size, 60.0);
    assert_eq!(layout.state().baseline_client_size, window.client_size());
}

proptest! {
    #[test]
    fn content_pass_is_idempotent(
        title in "[ -~]{0,24}",
        time in "[0-9]{2}:[0-9]{2}:[0-9]{2}",
        title_size in 8.0f32..72.0,
        time_size in 8.0f32..96.0,
    ) {
        let mut window = HeadlessWindow::default();
        let mut layout = LayoutEngine::new(
            LayoutConfig::default(),
            FontSpec::new("Segoe UI", title_size),
            FontSpec::new("Segoe UI", time_size),
            window.client_size(),
        );
        let first = layout.on_content_changed(&title, &time, &mut window, &MonospaceMeasurer);
        let size = window.client_size();
        let resizes = window.resizes();
        let second = layout.on_content_changed(&title, &time, &mut window, &MonospaceMeasurer);
        prop_assert_eq!(first, second);
        prop_assert_eq!(window.client_size(), size);
        prop_assert_eq!(window.resizes(), resizes);
    }

    #[test]
    fn returning_to_the_baseline_size_never_drifts(
        sizes in prop::collection::vec((20i32..2_000, 20i32..2_000), 1..25),
    ) {
        let (mut layout, mut window) = fitted(24.0, 48.0);
        let base = window.client_size();
        layout.begin_interactive_resize();
        for (w, h) in sizes {
            window.user_resize(Size::new(w, h));
            layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
            prop_assert!(layout.font(FontRole::Title).size >= layout.config().min_font_size);
        }
        window.user_resize(base);
        layout.on_interactive_resize_tick(TITLE, TIME, &mut window, &MonospaceMeasurer);
        prop_assert_eq!(layout.font(FontRole::Title).size, 24.0);
        prop_assert_eq!(layout.font(FontRole::Time).size, 48.0);
    }
}
