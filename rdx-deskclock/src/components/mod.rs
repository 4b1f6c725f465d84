//! Contains the stateful components the `DeskClockEngine` is built from.

pub mod drag;
pub mod layout;
pub mod mode;
pub mod style;
