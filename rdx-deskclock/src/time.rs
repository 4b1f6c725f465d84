//! Time sources and the periodic tick driver.
//!
//! The core never calls `Local::now()` directly. It reads the current time from
//! a [`TimeSource`], which is the real local clock in the binaries and a
//! hand-advanced [`ManualTime`] in tests.

use crate::config::ClockResolution;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::cell::Cell;
use std::rc::Rc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Supplies the current local wall-clock time.
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl TimeSource for LocalTime {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle and
/// give the other to the engine.
#[derive(Debug, Clone)]
pub struct ManualTime {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualTime {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(TimeDelta::seconds(secs));
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// One pulse of the `SystemClock`.
#[derive(Debug, Clone, Copy)]
pub struct TickEvent {
    /// Monotonic count of ticks since the clock started, starting at 1.
    pub tick_count: u64,
    pub timestamp: Instant,
}

/// The single source of ticks for the engine.
///
/// Runs as its own task and pushes a `TickEvent` into the engine's tick
/// channel once per period. Ticks that could not be delivered on time are
/// delayed, never bunched, so a busy UI thread cannot receive a burst.
pub struct SystemClock {
    resolution: ClockResolution,
    tick_sender: mpsc::Sender<TickEvent>,
}

impl SystemClock {
    pub fn new(resolution: ClockResolution, tick_sender: mpsc::Sender<TickEvent>) -> Self {
        Self {
            resolution,
            tick_sender,
        }
    }

    /// Ticks until `shutdown_rx` fires or the receiving side is dropped.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = self.resolution.period();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first `tick()` completes immediately; the engine already rendered
        // a frame on mode selection, so skip it.
        ticker.tick().await;
        info!("SystemClock started with a period of {:?}.", period);

        let mut tick_count = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                timestamp = ticker.tick() => {
                    tick_count += 1;
                    let event = TickEvent { tick_count, timestamp };
                    if self.tick_sender.send(event).await.is_err() {
                        debug!("Tick receiver dropped; stopping the clock.");
                        break;
                    }
                }
            }
        }
        info!("SystemClock stopped after {} ticks.", tick_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn manual_time_clones_share_the_instant() {
        let time = ManualTime::new(noon());
        let handle = time.clone();
        handle.advance_secs(90);
        assert_eq!(time.now(), noon() + TimeDelta::seconds(90));
    }

    #[tokio::test(start_paused = true)]
    async fn system_clock_ticks_once_per_period() {
        let (tick_tx, mut tick_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let clock = SystemClock::new(ClockResolution::Low, tick_tx);
        let handle = tokio::spawn(clock.run(shutdown_rx));

        let start = Instant::now();
        let first = tick_rx.recv().await.unwrap();
        let second = tick_rx.recv().await.unwrap();
        assert_eq!(first.tick_count, 1);
        assert_eq!(second.tick_count, 2);
        assert_eq!(first.timestamp - start, Duration::from_secs(1));
        assert_eq!(second.timestamp - first.timestamp, Duration::from_secs(1));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn system_clock_stops_when_receiver_is_dropped() {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        drop(tick_rx);
        let clock = SystemClock::new(ClockResolution::Low, tick_tx);
        clock.run(shutdown_rx).await;
    }
}
