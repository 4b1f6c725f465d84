//! The core engine that ties the desk clock together.

use crate::commands::Command;
use crate::common::Rgb;
use crate::components::drag::{DragController, PressOutcome};
use crate::components::layout::{FontRole, FontSpec, LayoutEngine, LayoutState};
use crate::components::mode::{DisplayMode, ModeController, ModeFrame};
use crate::components::style::{StyleAttribute, WindowStyleManager, WindowStyleState};
use crate::config::{DeskClockConfig, Language};
use crate::events::{ClockEvent, InputEvent};
use crate::format::date_title;
use crate::platform::{LabelScene, PlatformWindow, Scene, TextMeasurer};
use crate::time::{SystemClock, TimeSource};
use chrono::NaiveDateTime;
use std::future::Future;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, trace, warn};

/// The two strings on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayText {
    pub title: String,
    pub time: String,
    /// Set once the user typed a title; the date title is no longer refreshed.
    pub title_customized: bool,
}

/// The main desk clock engine.
///
/// Owns the window and every component. All state changes happen on the
/// thread that drives the engine: ticks, commands and input are funnelled
/// through [`run`](Self::run), or called directly by a host that owns its own
/// event loop.
pub struct DeskClockEngine<W: PlatformWindow> {
    config: DeskClockConfig,
    window: W,
    measurer: Box<dyn TextMeasurer>,
    time: Box<dyn TimeSource>,
    modes: ModeController,
    layout: LayoutEngine,
    styles: WindowStyleManager,
    drag: DragController,
    text: DisplayText,
    text_color: Rgb,
    last_published: Option<(String, String)>,
    event_sender: broadcast::Sender<ClockEvent>,
}

// Core implementation block for internal logic.
impl<W: PlatformWindow> DeskClockEngine<W> {
    /// Creates the engine and brings the window to its startup state: Clock
    /// mode, default styles, the date title and a fitted, centered layout.
    pub fn new(
        config: DeskClockConfig,
        window: W,
        measurer: Box<dyn TextMeasurer>,
        time: Box<dyn TimeSource>,
    ) -> Self {
        let (event_sender, _) = broadcast::channel(64);
        let now = time.now();
        let modes = ModeController::new(config.locale.clone());
        let layout = LayoutEngine::new(
            config.layout.clone(),
            FontSpec::default_title(),
            FontSpec::default_time(),
            window.client_size(),
        );
        let text = DisplayText {
            title: date_title(now, &config.locale),
            time: modes.current_text(now),
            title_customized: false,
        };

        let mut engine = Self {
            styles: WindowStyleManager::new(config.style.clone()),
            drag: DragController::new(config.layout.grip_size),
            config,
            window,
            measurer,
            time,
            modes,
            layout,
            text,
            text_color: Rgb::WHITE,
            last_published: None,
            event_sender,
        };
        let failed = engine.styles.apply_all(&mut engine.window);
        engine.report_style_failures(failed);
        engine.refresh_explicit();
        info!("DeskClockEngine ready at {:?}.", engine.window.client_size());
        engine
    }

    /// Runs the dispatcher loop until Ctrl+C or until the command channel
    /// closes.
    pub async fn run(
        &mut self,
        commands: mpsc::Receiver<Command>,
        input: mpsc::Receiver<InputEvent>,
    ) -> anyhow::Result<()> {
        self.run_until(commands, input, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Could not listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs the dispatcher loop until `shutdown` completes or the command
    /// channel closes.
    ///
    /// Spawns the `SystemClock` on the current runtime and stops it before
    /// returning.
    pub async fn run_until(
        &mut self,
        mut commands: mpsc::Receiver<Command>,
        mut input: mpsc::Receiver<InputEvent>,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        info!("DeskClockEngine starting up...");
        let (shutdown_tx, _) = broadcast::channel(1);
        let (tick_tx, mut tick_rx) = mpsc::channel(16);

        let clock = SystemClock::new(self.config.resolution.clone(), tick_tx);
        let clock_task = tokio::spawn(clock.run(shutdown_tx.subscribe()));

        self.event_sender.send(ClockEvent::EngineStarted).ok();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break;
                }
                Some(tick) = tick_rx.recv() => {
                    trace!("Tick #{} received.", tick.tick_count);
                    self.on_tick();
                }
                command = commands.recv() => match command {
                    Some(command) => self.execute(command),
                    None => {
                        info!("Command channel closed.");
                        break;
                    }
                },
                Some(event) = input.recv() => self.handle_input(event),
            }
        }

        if shutdown_tx.send(()).is_err() {
            debug!("SystemClock already stopped.");
        }
        clock_task.await?;
        self.event_sender.send(ClockEvent::EngineShutdown).ok();
        info!("DeskClockEngine has shut down.");
        Ok(())
    }

    /// Lets the active mode handle one tick and repaints.
    pub fn on_tick(&mut self) {
        let now = self.time.now();
        let subscription = self.modes.subscription();
        let Some(frame) = self.modes.on_tick(now) else {
            trace!("Tick with no active subscription.");
            return;
        };
        self.text.time = frame.time_text;
        self.refresh();

        if frame.expired {
            let mode = self.modes.mode().kind();
            self.event_sender.send(ClockEvent::Expired { mode }).ok();
        }
        if let (Some(id), None) = (subscription, self.modes.subscription()) {
            self.event_sender.send(ClockEvent::SubscriptionRemoved { id }).ok();
        }
    }

    /// Re-renders the title from the current date unless the user set one.
    fn refresh_date_title(&mut self, now: NaiveDateTime) {
        if !self.text.title_customized {
            self.text.title = date_title(now, self.modes.locale());
        }
    }

    fn switch_mode(&mut self, select: impl FnOnce(&mut ModeController, NaiveDateTime) -> ModeFrame) {
        let now = self.time.now();
        let previous = self.modes.subscription();
        let frame = select(&mut self.modes, now);

        if let Some(id) = previous {
            self.event_sender.send(ClockEvent::SubscriptionRemoved { id }).ok();
        }
        if let Some(id) = self.modes.subscription() {
            self.event_sender.send(ClockEvent::SubscriptionAdded { id }).ok();
        }
        let mode = self.modes.mode().kind();
        self.event_sender.send(ClockEvent::ModeChanged { mode }).ok();

        self.text.time = frame.time_text;
        self.refresh();
    }

    /// Layout pass for a content change that is not an explicit edit.
    fn refresh(&mut self) {
        self.layout.on_content_changed(
            &self.text.title,
            &self.text.time,
            &mut self.window,
            self.measurer.as_ref(),
        );
        self.present();
    }

    /// Layout pass for an explicit edit, which also moves the scaling baseline.
    fn refresh_explicit(&mut self) {
        self.refresh();
        self.layout.rebaseline(&self.window);
    }

    fn present(&mut self) {
        let placement = self.layout.placement();
        let scene = Scene {
            title: LabelScene {
                text: self.text.title.clone(),
                font: self.layout.font(FontRole::Title).clone(),
                bounds: placement.title,
            },
            time: LabelScene {
                text: self.text.time.clone(),
                font: self.layout.font(FontRole::Time).clone(),
                bounds: placement.time,
            },
            text_color: self.text_color,
        };
        if let Err(e) = self.window.present(&scene) {
            warn!("Could not present the frame: {:#}", e);
        }

        let published = (self.text.title.clone(), self.text.time.clone());
        if self.last_published.as_ref() != Some(&published) {
            let (title, time) = published.clone();
            self.last_published = Some(published);
            self.event_sender
                .send(ClockEvent::DisplayTextChanged { title, time })
                .ok();
        }
    }

    fn report_style(&self, result: Result<(), StyleAttribute>) {
        if let Err(attribute) = result {
            self.event_sender
                .send(ClockEvent::StyleApplyFailed { attribute })
                .ok();
        }
    }

    fn report_style_failures(&self, failed: Vec<StyleAttribute>) {
        for attribute in failed {
            self.report_style(Err(attribute));
        }
    }
}

// Public API implementation block.
impl<W: PlatformWindow> DeskClockEngine<W> {
    /// Applies one command.
    pub fn execute(&mut self, command: Command) {
        debug!("Executing {:?}.", command);
        match command {
            Command::ShowClock => self.switch_mode(|modes, now| modes.select_clock_mode(now)),
            Command::StartCountdown { seconds } => {
                self.switch_mode(|modes, now| modes.select_countdown_mode(seconds, now))
            }
            Command::StartTarget { time_of_day } => {
                self.switch_mode(|modes, now| modes.select_target_mode(time_of_day, now))
            }
            Command::SetOpacity { percent } => {
                let result = self
                    .styles
                    .set_opacity(f64::from(percent.min(100)) / 100.0, &mut self.window);
                self.report_style(result);
            }
            Command::SetAlwaysOnTop(on_top) => {
                let result = self.styles.set_always_on_top(on_top, &mut self.window);
                self.report_style(result);
            }
            Command::SetDraggingEnabled(enabled) => {
                if !enabled {
                    self.release_pointer();
                }
                let result = self.styles.set_dragging_enabled(enabled, &mut self.window);
                self.report_style(result);
            }
            Command::SetTransparencyEnabled(enabled) => {
                let result = self
                    .styles
                    .set_color_key_transparency_enabled(enabled, &mut self.window);
                self.report_style(result);
            }
            Command::SetTextColor(color) => {
                self.text_color = color;
                self.present();
            }
            Command::SetFont { role, font } => {
                self.layout.set_font(role, font);
                self.refresh_explicit();
            }
            Command::SetTitleText(title) => {
                self.text.title = title;
                self.text.title_customized = true;
                self.refresh_explicit();
            }
            Command::SetLanguage(language) => self.set_language(language),
            Command::ResetToDefaults => self.reset_to_defaults(),
        }
    }

    /// Applies one pointer or resize event.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { local, screen } => {
                if self.styles.state().click_through_active() {
                    trace!("Pointer press ignored; the window is click-through.");
                    return;
                }
                let target = self
                    .drag
                    .hit_test(local, &self.layout.placement(), self.window.client_size());
                let outcome = self.drag.press(
                    target,
                    screen,
                    self.window.position(),
                    self.styles.state().dragging_enabled,
                );
                trace!("Press on {:?}: {:?}.", target, outcome);
                if outcome == PressOutcome::ResizeGrip {
                    self.layout.begin_interactive_resize();
                }
            }
            InputEvent::PointerMove { screen } => {
                if let Some(position) = self.drag.drag_to(screen, self.styles.state().dragging_enabled) {
                    if let Err(e) = self.window.set_position(position) {
                        warn!("Could not move the window to {:?}: {:#}", position, e);
                    }
                }
            }
            InputEvent::PointerUp => self.release_pointer(),
            InputEvent::ResizeBegin => self.layout.begin_interactive_resize(),
            InputEvent::Resized { size } => {
                if self.window.client_size() != size {
                    if let Err(e) = self.window.set_client_size(size) {
                        warn!("Could not apply the reported size {:?}: {:#}", size, e);
                    }
                }
                if self.layout.state().interactive_resize_in_progress {
                    self.layout.on_interactive_resize_tick(
                        &self.text.title,
                        &self.text.time,
                        &mut self.window,
                        self.measurer.as_ref(),
                    );
                    self.present();
                } else {
                    self.refresh();
                }
            }
            InputEvent::ResizeEnd => self.end_interactive_resize(),
        }
    }

    /// Drops the drag anchor. Letting go of the grip also ends the resize
    /// gesture, so auto-sizing resumes.
    fn release_pointer(&mut self) {
        if self.drag.release() && self.layout.state().interactive_resize_in_progress {
            self.end_interactive_resize();
        }
    }

    fn end_interactive_resize(&mut self) {
        self.layout.on_interactive_resize_end(
            &self.text.title,
            &self.text.time,
            &mut self.window,
            self.measurer.as_ref(),
        );
        self.present();
    }

    fn set_language(&mut self, language: Language) {
        let mut locale = self.modes.locale().clone();
        locale.language = language;
        self.modes.set_locale(locale);
        self.refresh_date_title(self.time.now());
        info!("Language is now {:?}.", language);
        self.refresh_explicit();
    }

    /// Puts fonts, colors, styles, title and mode back to their startup values.
    fn reset_to_defaults(&mut self) {
        let failed = self.styles.reset(&mut self.window);
        self.report_style_failures(failed);
        self.layout.set_font(FontRole::Title, FontSpec::default_title());
        self.layout.set_font(FontRole::Time, FontSpec::default_time());
        self.text_color = Rgb::WHITE;
        self.modes.set_locale(self.config.locale.clone());
        self.text.title_customized = false;
        self.refresh_date_title(self.time.now());
        self.switch_mode(|modes, now| modes.select_clock_mode(now));
        self.layout.rebaseline(&self.window);
        info!("Settings reset to defaults.");
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_sender.subscribe()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Direct window access for hosts that need to feed it OS state.
    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn text(&self) -> &DisplayText {
        &self.text
    }

    pub fn text_color(&self) -> Rgb {
        self.text_color
    }

    pub fn mode(&self) -> DisplayMode {
        self.modes.mode()
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn layout_state(&self) -> &LayoutState {
        self.layout.state()
    }

    pub fn style_state(&self) -> &WindowStyleState {
        self.styles.state()
    }

    pub fn config(&self) -> &DeskClockConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mode::ModeKind;
    use crate::platform::headless::{HeadlessWindow, MonospaceMeasurer};
    use crate::time::ManualTime;
    use chrono::NaiveDate;

    fn engine_at(h: u32, m: u32, s: u32) -> (DeskClockEngine<HeadlessWindow>, ManualTime) {
        let time = ManualTime::new(
            NaiveDate::from_ymd_opt(2026, 10, 18)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        );
        let engine = DeskClockEngine::new(
            DeskClockConfig::default(),
            HeadlessWindow::default(),
            Box::new(MonospaceMeasurer),
            Box::new(time.clone()),
        );
        (engine, time)
    }

    #[test]
    fn startup_shows_date_title_and_clock() {
        let (engine, _) = engine_at(14, 5, 9);
        assert_eq!(engine.text().title, "10/18/午後");
        assert_eq!(engine.text().time, "14:05:09");
        let scene = engine.window().scene().unwrap();
        assert_eq!(scene.time.text, "14:05:09");
        assert_eq!(scene.text_color, Rgb::WHITE);
        assert_eq!(engine.window().opacity(), 0.75);
        assert!(engine.window().is_topmost());
    }

    #[test]
    fn mode_switch_publishes_events_in_order() {
        let (mut engine, _) = engine_at(9, 0, 0);
        let mut events = engine.subscribe_events();
        let previous = engine.modes().subscription().unwrap();
        engine.execute(Command::StartCountdown { seconds: 90 });
        let current = engine.modes().subscription().unwrap();

        assert_eq!(events.try_recv().unwrap(), ClockEvent::SubscriptionRemoved { id: previous });
        assert_eq!(events.try_recv().unwrap(), ClockEvent::SubscriptionAdded { id: current });
        assert_eq!(
            events.try_recv().unwrap(),
            ClockEvent::ModeChanged { mode: ModeKind::Countdown }
        );
        assert!(matches!(
            events.try_recv().unwrap(),
            ClockEvent::DisplayTextChanged { time, .. } if time == "00:01:30"
        ));
    }

    #[test]
    fn identical_text_is_not_republished() {
        let (mut engine, _) = engine_at(9, 0, 0);
        let mut events = engine.subscribe_events();
        engine.execute(Command::SetTextColor(Rgb::new(0, 255, 0)));
        assert!(events.try_recv().is_err());
        assert_eq!(engine.window().scene().unwrap().text_color, Rgb::new(0, 255, 0));
    }

    #[test]
    fn custom_title_survives_language_switch() {
        let (mut engine, _) = engine_at(9, 0, 0);
        engine.execute(Command::SetLanguage(Language::English));
        assert_eq!(engine.text().title, "10/18/AM");
        engine.execute(Command::SetTitleText("Lunch".to_string()));
        engine.execute(Command::SetLanguage(Language::Japanese));
        assert_eq!(engine.text().title, "Lunch");
    }
}
