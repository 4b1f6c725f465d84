//! # Deskclock
//!
//! The tick-driven core of an always-on-top desktop clock widget.
//!
//! A small borderless window shows two labels: a title (the date and AM/PM
//! designator, or any text the user types) and a time value. The time value
//! is the live wall clock, a countdown, or a countdown towards a time of day.
//! This crate is everything except the pixels: the tick dispatch, the mode
//! state machine, the layout rules and the window-style bookkeeping.
//!
//! ## Core Concepts
//!
//! - **SystemClock**: A one-second ticker that acts as the single source of time.
//! - **Single subscription**: Each display mode owns exactly one tick handler.
//!   Switching modes swaps the handler in one call, so a tick is never handled
//!   twice and never lost.
//! - **Capability seam**: The engine only talks to the OS through the
//!   [`PlatformWindow`](platform::PlatformWindow) and
//!   [`TextMeasurer`](platform::TextMeasurer) traits. A headless window ships
//!   for tests and the shell; a Win32 window ships on Windows.
//! - **Event-Driven**: Collaborators issue `Command`s and subscribe to
//!   `ClockEvent`s (text changes, expiry, style failures).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use deskclock::platform::headless::{HeadlessWindow, MonospaceMeasurer};
//! use deskclock::prelude::*;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeskClockConfig::load("deskclock.toml")?;
//!     let mut engine = DeskClockEngine::new(
//!         config,
//!         HeadlessWindow::default(),
//!         Box::new(MonospaceMeasurer),
//!         Box::new(LocalTime),
//!     );
//!
//!     let mut events = engine.subscribe_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     let (command_tx, command_rx) = mpsc::channel(8);
//!     let (_input_tx, input_rx) = mpsc::channel(8);
//!     command_tx.send(Command::StartCountdown { seconds: 5 }).await?;
//!
//!     // Runs until Ctrl+C.
//!     engine.run(command_rx, input_rx).await
//! }
//! ```

pub const ENGINE_NAME: &str = "Desk Clock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod commands;
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod format;
pub mod platform;
pub mod scheduler;
pub mod time;

/// A prelude module for easy importing of the most common desk clock types.
pub mod prelude {
    pub use crate::commands::{Command, CommandError};
    pub use crate::common::{Point, Rect, Rgb, Size, SubscriptionId};
    pub use crate::components::layout::{FontRole, FontSpec};
    pub use crate::components::mode::{DisplayMode, ModeKind};
    pub use crate::config::{ClockResolution, DeskClockConfig, Language};
    pub use crate::engine::DeskClockEngine;
    pub use crate::events::{ClockEvent, InputEvent};
    pub use crate::platform::{PlatformWindow, TextMeasurer};
    pub use crate::time::{LocalTime, ManualTime, TimeSource};
}
