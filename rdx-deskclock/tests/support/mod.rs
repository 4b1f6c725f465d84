//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use deskclock::platform::headless::{HeadlessWindow, MonospaceMeasurer};
use deskclock::prelude::*;

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// An engine on a headless window whose clock only moves when told to.
pub fn engine_at(now: NaiveDateTime) -> (DeskClockEngine<HeadlessWindow>, ManualTime) {
    engine_with(now, HeadlessWindow::default())
}

pub fn engine_with(
    now: NaiveDateTime,
    window: HeadlessWindow,
) -> (DeskClockEngine<HeadlessWindow>, ManualTime) {
    let time = ManualTime::new(now);
    let engine = DeskClockEngine::new(
        DeskClockConfig::default(),
        window,
        Box::new(MonospaceMeasurer),
        Box::new(time.clone()),
    );
    (engine, time)
}

/// Drains every event currently buffered in `rx`.
pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<ClockEvent>) -> Vec<ClockEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
