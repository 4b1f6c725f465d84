use anyhow::Result;
use colored::Colorize;
use deskclock::platform::headless::{HeadlessWindow, MonospaceMeasurer};
use deskclock::prelude::*;
use deskclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct MyHighlighter;

impl Highlighter for MyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", format!("  {}", ENGINE_NAME).cyan().bold());
    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!("{}", "-----------------------------------------------------------------".dimmed());
    println!("{}", version_string);
    println!(
        "{}",
        "    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", "-----------------------------------------------------------------".dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  clock                     - Shows the live clock.");
    println!("  countdown <M> | <N>s      - Counts down M minutes (or N seconds).");
    println!("  target <HH:MM[:SS]>       - Counts down to the next occurrence of a time.");
    println!("  opacity <0-100>           - Sets the window opacity.");
    println!("  topmost on|off            - Keeps the window above others.");
    println!("  drag on|off               - Off makes the window click-through.");
    println!("  transparency on|off       - Color-key transparency of the background.");
    println!("  color <#RRGGBB>           - Sets the text color.");
    println!("  font title|time <S> [F]   - Sets a label font.");
    println!("  title <TEXT>              - Replaces the date title.");
    println!("  lang ja|en                - Switches the AM/PM designator.");
    println!("  reset                     - Restores all defaults.");
    println!("  press <X> <Y>             - Presses the pointer at window-local X,Y.");
    println!("  move <X> <Y>              - Moves the pointer by X,Y from the press.");
    println!("  release                   - Releases the pointer.");
    println!("  resize begin|end|<W> <H>  - Drives the resize grip.");
    println!("  watch on|off              - Prints every display text change.");
    println!("  exit                      - Quits the shell.");
}

/// Spawns a task printing the engine's notifications.
fn spawn_event_listener(engine: &DeskClockEngine<HeadlessWindow>, watching: Arc<AtomicBool>) {
    let mut event_rx = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            match event {
                ClockEvent::DisplayTextChanged { title, time } => {
                    if watching.load(Ordering::Relaxed) {
                        println!("<-- [{}] {}", title.dimmed(), time.green().bold());
                    }
                }
                ClockEvent::Expired { mode } => {
                    println!("\n<-- {} {} finished!\n>> ", "[EXPIRED]".red().bold(), mode);
                }
                ClockEvent::StyleApplyFailed { attribute } => {
                    println!("<-- {} could not apply {:?}", "[STYLE]".yellow(), attribute);
                }
                other => println!("<-- [EVENT] {:?}", other),
            }
        }
    });
}

/// Parses a pair of integers for the pointer commands.
fn parse_pair(args: &[&str]) -> Option<(i32, i32)> {
    match args {
        [x, y] => Some((x.parse().ok()?, y.parse().ok()?)),
        _ => None,
    }
}

/// Runs the blocking readline loop, forwarding commands and input to the
/// engine. Returns when the user exits; dropping the senders stops the engine.
fn readline_loop(
    commands: mpsc::Sender<Command>,
    input: mpsc::Sender<InputEvent>,
    watching: Arc<AtomicBool>,
) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(MyHighlighter {}));
    // Pointer commands are expressed relative to where the window started.
    let origin = Point::new(0, 0);
    let mut pressed_at = origin;

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting deskshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some(&word) = args.first() else {
            continue;
        };

        let event = match word {
            "exit" => break,
            "help" => {
                print_help();
                continue;
            }
            "watch" => {
                let on = args.get(1) == Some(&"on");
                watching.store(on, Ordering::Relaxed);
                println!("--> {} display text changes.", if on { "Printing" } else { "Hiding" });
                continue;
            }
            "press" => match parse_pair(&args[1..]) {
                Some((x, y)) => {
                    pressed_at = Point::new(origin.x + x, origin.y + y);
                    InputEvent::PointerDown {
                        local: Point::new(x, y),
                        screen: pressed_at,
                    }
                }
                None => {
                    println!("Usage: press <X> <Y>");
                    continue;
                }
            },
            "move" => match parse_pair(&args[1..]) {
                Some((dx, dy)) => InputEvent::PointerMove {
                    screen: pressed_at + Point::new(dx, dy),
                },
                None => {
                    println!("Usage: move <DX> <DY>");
                    continue;
                }
            },
            "release" => InputEvent::PointerUp,
            "resize" => match &args[1..] {
                ["begin"] => InputEvent::ResizeBegin,
                ["end"] => InputEvent::ResizeEnd,
                pair => match parse_pair(pair) {
                    Some((w, h)) => InputEvent::Resized { size: Size::new(w, h) },
                    None => {
                        println!("Usage: resize begin|end|<W> <H>");
                        continue;
                    }
                },
            },
            _ => {
                match line.parse::<Command>() {
                    Ok(command) => {
                        if commands.blocking_send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => println!("Error: {}. Type 'help'.", e),
                }
                continue;
            }
        };
        if input.blocking_send(event).is_err() {
            break;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = DeskClockConfig::load("deskclock.toml")?;
    let mut engine = DeskClockEngine::new(
        config,
        HeadlessWindow::default(),
        Box::new(MonospaceMeasurer),
        Box::new(LocalTime),
    );

    let watching = Arc::new(AtomicBool::new(false));
    spawn_event_listener(&engine, watching.clone());

    let (command_tx, command_rx) = mpsc::channel(32);
    let (input_tx, input_rx) = mpsc::channel(32);
    let shell = tokio::task::spawn_blocking(move || readline_loop(command_tx, input_tx, watching));

    println!("{} is running. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());
    engine.run(command_rx, input_rx).await?;

    if let Some(scene) = engine.window().scene() {
        info!(
            "Final frame: '{}' / '{}' at {:?}.",
            scene.title.text,
            scene.time.text,
            engine.window().client_size()
        );
    }
    // Ctrl+C leaves the readline thread blocked; only wait for a clean exit.
    if shell.is_finished() {
        shell.await??;
    }
    Ok(())
}
