//! The display-mode state machine.
//!
//! Each mode owns one tick handler, looked up from a fixed table keyed by the
//! mode's kind. Selecting a mode swaps the handler in the `TickScheduler` in a
//! single call and renders a frame immediately, so the display never shows the
//! previous mode's value while waiting for the next tick.

use crate::common::SubscriptionId;
use crate::config::LocaleConfig;
use crate::format::{clock_text, duration_text, seconds_text, ZERO_DURATION};
use crate::scheduler::TickScheduler;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;
use tracing::{info, trace};

/// What the time label is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// The live wall clock.
    Clock,
    /// A countdown that loses one second per tick.
    Countdown { remaining_secs: u64 },
    /// A countdown towards an absolute local time.
    Target { target: NaiveDateTime },
}

impl DisplayMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            DisplayMode::Clock => ModeKind::Clock,
            DisplayMode::Countdown { .. } => ModeKind::Countdown,
            DisplayMode::Target { .. } => ModeKind::Target,
        }
    }
}

/// The payload-free discriminant of a `DisplayMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Clock,
    Countdown,
    Target,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Clock => "clock",
            ModeKind::Countdown => "countdown",
            ModeKind::Target => "target",
        };
        f.write_str(name)
    }
}

/// The current mode plus the bookkeeping tied to its subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub mode: DisplayMode,
    /// The live subscription. `None` once a countdown has halted.
    pub subscription: Option<SubscriptionId>,
    /// Set when the expiry notification has been raised for this mode.
    pub expired: bool,
}

/// One rendered value of the time label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFrame {
    pub time_text: String,
    /// `true` on exactly the frame that reached zero.
    pub expired: bool,
}

/// What a tick handler decided.
#[derive(Debug)]
struct TickOutcome {
    text: String,
    halt: bool,
}

impl TickOutcome {
    fn running(text: String) -> Self {
        Self { text, halt: false }
    }

    fn halted() -> Self {
        Self {
            text: ZERO_DURATION.to_string(),
            halt: true,
        }
    }
}

type TickHandler = fn(&mut DisplayMode, NaiveDateTime, &LocaleConfig) -> TickOutcome;

/// The mode table.
fn handler_for(kind: ModeKind) -> TickHandler {
    match kind {
        ModeKind::Clock => clock_tick,
        ModeKind::Countdown => countdown_tick,
        ModeKind::Target => target_tick,
    }
}

fn clock_tick(mode: &mut DisplayMode, now: NaiveDateTime, locale: &LocaleConfig) -> TickOutcome {
    TickOutcome::running(render(mode, now, locale))
}

fn countdown_tick(mode: &mut DisplayMode, now: NaiveDateTime, locale: &LocaleConfig) -> TickOutcome {
    let DisplayMode::Countdown { remaining_secs } = mode else {
        return TickOutcome::running(render(mode, now, locale));
    };
    // The tick that reaches zero is the expiring tick.
    *remaining_secs = remaining_secs.saturating_sub(1);
    if *remaining_secs == 0 {
        TickOutcome::halted()
    } else {
        TickOutcome::running(seconds_text(*remaining_secs as i64))
    }
}

fn target_tick(mode: &mut DisplayMode, now: NaiveDateTime, locale: &LocaleConfig) -> TickOutcome {
    let DisplayMode::Target { target } = mode else {
        return TickOutcome::running(render(mode, now, locale));
    };
    let remaining = *target - now;
    if remaining > TimeDelta::zero() {
        TickOutcome::running(duration_text(remaining))
    } else {
        TickOutcome::halted()
    }
}

/// Renders the mode's value without advancing it.
fn render(mode: &DisplayMode, now: NaiveDateTime, locale: &LocaleConfig) -> String {
    match mode {
        DisplayMode::Clock => clock_text(now, locale),
        DisplayMode::Countdown { remaining_secs } => seconds_text(*remaining_secs as i64),
        DisplayMode::Target { target } => duration_text(*target - now),
    }
}

/// Resolves a time of day to the next local instant strictly after `now`.
pub fn resolve_target(time_of_day: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time_of_day);
    if today <= now {
        today + TimeDelta::days(1)
    } else {
        today
    }
}

/// Drives the time label through the Clock, Countdown and Target modes.
pub struct ModeController {
    state: TimerState,
    scheduler: TickScheduler<TickHandler>,
    locale: LocaleConfig,
}

impl ModeController {
    /// Creates a controller in Clock mode with its handler installed.
    pub fn new(locale: LocaleConfig) -> Self {
        let mut scheduler = TickScheduler::new();
        let (id, _) = scheduler.subscribe(handler_for(ModeKind::Clock));
        Self {
            state: TimerState {
                mode: DisplayMode::Clock,
                subscription: Some(id),
                expired: false,
            },
            scheduler,
            locale,
        }
    }

    pub fn select_clock_mode(&mut self, now: NaiveDateTime) -> ModeFrame {
        self.enter(DisplayMode::Clock, now)
    }

    /// Starts a countdown. Negative durations are clamped to zero, which
    /// expires on the next tick.
    pub fn select_countdown_mode(&mut self, duration_secs: i64, now: NaiveDateTime) -> ModeFrame {
        let remaining_secs = duration_secs.max(0) as u64;
        self.enter(DisplayMode::Countdown { remaining_secs }, now)
    }

    /// Counts down to the next occurrence of `time_of_day`. A time that is not
    /// strictly in the future today rolls forward one day.
    pub fn select_target_mode(&mut self, time_of_day: NaiveTime, now: NaiveDateTime) -> ModeFrame {
        let target = resolve_target(time_of_day, now);
        self.enter(DisplayMode::Target { target }, now)
    }

    fn enter(&mut self, mode: DisplayMode, now: NaiveDateTime) -> ModeFrame {
        let (id, _replaced) = self.scheduler.subscribe(handler_for(mode.kind()));
        self.state = TimerState {
            mode,
            subscription: Some(id),
            expired: false,
        };
        info!("Display mode is now {}.", mode.kind());
        ModeFrame {
            time_text: render(&self.state.mode, now, &self.locale),
            expired: false,
        }
    }

    /// Runs the active handler for one tick.
    ///
    /// Returns `None` when the mode has halted and nothing is subscribed.
    pub fn on_tick(&mut self, now: NaiveDateTime) -> Option<ModeFrame> {
        let (id, handler) = self.scheduler.advance()?;
        let outcome = handler(&mut self.state.mode, now, &self.locale);
        let mut expired = false;
        if outcome.halt {
            self.scheduler.unsubscribe(id);
            self.state.subscription = None;
            if !self.state.expired {
                self.state.expired = true;
                expired = true;
                info!("{} mode expired.", self.state.mode.kind());
            }
        }
        trace!("Tick frame: {}", outcome.text);
        Some(ModeFrame {
            time_text: outcome.text,
            expired,
        })
    }

    /// The value the time label should show right now, without ticking.
    pub fn current_text(&self, now: NaiveDateTime) -> String {
        if self.state.expired {
            return ZERO_DURATION.to_string();
        }
        render(&self.state.mode, now, &self.locale)
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> DisplayMode {
        self.state.mode
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.state.subscription
    }

    /// Number of installed tick handlers; never more than one.
    pub fn subscriber_count(&self) -> usize {
        self.scheduler.subscriber_count()
    }

    /// Total ticks that reached a handler.
    pub fn dispatched_ticks(&self) -> u64 {
        self.scheduler.dispatched()
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: LocaleConfig) {
        self.locale = locale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn controller() -> ModeController {
        ModeController::new(LocaleConfig::default())
    }

    #[test]
    fn starts_in_clock_mode_with_one_subscription() {
        let controller = controller();
        assert_eq!(controller.mode(), DisplayMode::Clock);
        assert!(controller.subscription().is_some());
        assert_eq!(controller.subscriber_count(), 1);
    }

    #[test]
    fn clock_tick_formats_wall_time() {
        let mut controller = controller();
        let frame = controller.on_tick(at(8, 4, 2)).unwrap();
        assert_eq!(frame.time_text, "08:04:02");
        assert!(!frame.expired);
    }

    #[test]
    fn countdown_shows_full_duration_on_selection() {
        let mut controller = controller();
        let frame = controller.select_countdown_mode(90, at(9, 0, 0));
        assert_eq!(frame.time_text, "00:01:30");
        let frame = controller.on_tick(at(9, 0, 1)).unwrap();
        assert_eq!(frame.time_text, "00:01:29");
    }

    #[test]
    fn countdown_expires_on_the_tick_reaching_zero() {
        let mut controller = controller();
        controller.select_countdown_mode(2, at(9, 0, 0));
        let first = controller.on_tick(at(9, 0, 1)).unwrap();
        assert_eq!(first.time_text, "00:00:01");
        assert!(!first.expired);
        let second = controller.on_tick(at(9, 0, 2)).unwrap();
        assert_eq!(second.time_text, ZERO_DURATION);
        assert!(second.expired);
        assert_eq!(controller.subscription(), None);
        assert!(controller.on_tick(at(9, 0, 3)).is_none());
        assert_eq!(controller.current_text(at(9, 0, 4)), ZERO_DURATION);
    }

    #[test]
    fn negative_countdown_clamps_to_zero() {
        let mut controller = controller();
        let frame = controller.select_countdown_mode(-30, at(9, 0, 0));
        assert_eq!(frame.time_text, ZERO_DURATION);
        assert_eq!(controller.mode(), DisplayMode::Countdown { remaining_secs: 0 });
        let frame = controller.on_tick(at(9, 0, 1)).unwrap();
        assert!(frame.expired);
    }

    #[test]
    fn past_target_rolls_forward_one_day() {
        let now = at(18, 0, 0);
        let target = resolve_target(NaiveTime::from_hms_opt(7, 30, 0).unwrap(), now);
        assert_eq!(target, at(7, 30, 0) + TimeDelta::days(1));
        let same = resolve_target(NaiveTime::from_hms_opt(18, 0, 0).unwrap(), now);
        assert_eq!(same, now + TimeDelta::days(1));
        let later = resolve_target(NaiveTime::from_hms_opt(18, 0, 1).unwrap(), now);
        assert_eq!(later, at(18, 0, 1));
    }

    #[test]
    fn target_counts_down_and_expires_once() {
        let mut controller = controller();
        let frame = controller.select_target_mode(NaiveTime::from_hms_opt(10, 0, 2).unwrap(), at(10, 0, 0));
        assert_eq!(frame.time_text, "00:00:02");
        assert_eq!(controller.on_tick(at(10, 0, 1)).unwrap().time_text, "00:00:01");
        let last = controller.on_tick(at(10, 0, 2)).unwrap();
        assert_eq!(last.time_text, ZERO_DURATION);
        assert!(last.expired);
        assert!(controller.on_tick(at(10, 0, 3)).is_none());
    }

    #[test]
    fn reselecting_resets_expiry() {
        let mut controller = controller();
        controller.select_countdown_mode(1, at(9, 0, 0));
        assert!(controller.on_tick(at(9, 0, 1)).unwrap().expired);
        controller.select_countdown_mode(1, at(9, 0, 1));
        assert!(!controller.state().expired);
        assert!(controller.on_tick(at(9, 0, 2)).unwrap().expired);
    }

    #[test]
    fn mode_switches_keep_a_single_subscription() {
        let mut controller = controller();
        let now = at(12, 0, 0);
        let mut seen = Vec::new();
        for i in 0..10 {
            match i % 3 {
                0 => controller.select_countdown_mode(600, now),
                1 => controller.select_target_mode(NaiveTime::from_hms_opt(13, 0, 0).unwrap(), now),
                _ => controller.select_clock_mode(now),
            };
            let id = controller.subscription().unwrap();
            assert!(!seen.contains(&id));
            seen.push(id);
            assert_eq!(controller.subscriber_count(), 1);
        }
    }
}
