//! Defines the notifications broadcast by the engine and the raw input events
//! the host feeds into it.
//!
//! Collaborators (a tray icon mirroring the text, an alert dialog on expiry)
//! subscribe to `ClockEvent`s through
//! [`DeskClockEngine::subscribe_events`](crate::engine::DeskClockEngine::subscribe_events).

use crate::common::{Point, Size, SubscriptionId};
use crate::components::mode::ModeKind;
use crate::components::style::StyleAttribute;

/// Everything the core tells the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    /// Fired once when the dispatcher loop begins.
    EngineStarted,
    /// Fired once when the dispatcher loop is about to exit.
    EngineShutdown,
    /// A countdown or target time reached zero. Fired exactly once per run.
    Expired { mode: ModeKind },
    /// Either label's text changed.
    DisplayTextChanged { title: String, time: String },
    /// A `select_*` call installed a new mode.
    ModeChanged { mode: ModeKind },
    /// A tick handler was installed.
    SubscriptionAdded { id: SubscriptionId },
    /// A tick handler was removed, by a mode switch or by expiry.
    SubscriptionRemoved { id: SubscriptionId },
    /// A window attribute could not be applied; the requested state is kept.
    StyleApplyFailed { attribute: StyleAttribute },
}

/// Pointer and resize input, as reported by the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Primary button pressed. `local` is client-relative, `screen` absolute.
    PointerDown { local: Point, screen: Point },
    PointerMove { screen: Point },
    PointerUp,
    /// The user grabbed the resize grip.
    ResizeBegin,
    /// The client area now has `size`. Headless hosts use this to drive the
    /// window; on a real window the size has already been applied.
    Resized { size: Size },
    /// The user let go of the resize grip.
    ResizeEnd,
}
