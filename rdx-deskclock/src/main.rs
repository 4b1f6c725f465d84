use anyhow::Result;
use colored::Colorize;
use deskclock::platform::headless::{HeadlessWindow, MonospaceMeasurer};
use deskclock::prelude::*;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 2. Load the configuration, then speed the clock up for the demo.
    let mut config = DeskClockConfig::load("deskclock.toml")?;
    config.resolution = ClockResolution::Custom { ticks_per_second: 4 };

    // 3. Create the engine around an in-memory window.
    let mut engine = DeskClockEngine::new(
        config,
        HeadlessWindow::default(),
        Box::new(MonospaceMeasurer),
        Box::new(LocalTime),
    );

    // 4. Print every notification.
    spawn_event_listener(&engine);

    // 5. Script a short session: a countdown, a custom title, a drag.
    let (command_tx, command_rx) = mpsc::channel(16);
    let (input_tx, input_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let script = [
            Command::StartCountdown { seconds: 3 },
            Command::SetTitleText("Tea".to_string()),
            Command::SetOpacity { percent: 90 },
        ];
        for command in script {
            if command_tx.send(command).await.is_err() {
                return;
            }
        }
        let drag = [
            InputEvent::PointerDown {
                local: Point::new(60, 60),
                screen: Point::new(60, 60),
            },
            InputEvent::PointerMove {
                screen: Point::new(160, 90),
            },
            InputEvent::PointerUp,
        ];
        for event in drag {
            if input_tx.send(event).await.is_err() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        command_tx.send(Command::ShowClock).await.ok();
        tokio::time::sleep(Duration::from_secs(1)).await;
        // Dropping the sender ends the run.
    });

    // 6. Run the engine.
    engine.run(command_rx, input_rx).await?;
    info!("Window ended at {:?}.", engine.window().position());
    Ok(())
}

/// Spawns a task that prints the engine's event stream.
fn spawn_event_listener(engine: &DeskClockEngine<HeadlessWindow>) {
    let mut event_rx = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            match event {
                ClockEvent::DisplayTextChanged { title, time } => {
                    info!("[DISPLAY] {} {}", title.dimmed(), time.green().bold())
                }
                ClockEvent::Expired { mode } => info!("[EXPIRED] {}", mode.to_string().red().bold()),
                other => info!("[EVENT] => {:?}", other),
            }
        }
    });
}
