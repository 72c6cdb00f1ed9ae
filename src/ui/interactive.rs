//! Keyboard-driven mode: each key is one gesture on the robot screen

use crate::coordinator::SpeechOptions;
use crate::ui::cli::{format_badges, format_event, format_settings};
use crate::ui::gestures::Gestures;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const LOG_TARGET: &str = "reflectobot::ui::interactive";
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Sounds and poses used by the speaking keys.
#[derive(Debug, Clone)]
pub struct InteractiveOptions {
    pub greeting: String,
    pub name: String,
    pub poses: Vec<String>,
    pub idle_pose: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Hover,
    Click,
    Greet,
    Name,
    StopSpeech,
    StopHover,
    ToggleVoices,
    ToggleSounds,
    ShowBadges,
    Quit,
}

pub fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    match (code, modifiers) {
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(KeyAction::Quit),
        (KeyCode::Char('h'), _) => Some(KeyAction::Hover),
        (KeyCode::Char('c'), _) => Some(KeyAction::Click),
        (KeyCode::Char('g'), _) => Some(KeyAction::Greet),
        (KeyCode::Char('n'), _) => Some(KeyAction::Name),
        (KeyCode::Char('s'), _) => Some(KeyAction::StopSpeech),
        (KeyCode::Char('x'), _) => Some(KeyAction::StopHover),
        (KeyCode::Char('v'), _) => Some(KeyAction::ToggleVoices),
        (KeyCode::Char('o'), _) => Some(KeyAction::ToggleSounds),
        (KeyCode::Char('b'), _) => Some(KeyAction::ShowBadges),
        _ => None,
    }
}

/// Restores cooked mode however the loop exits.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

// Raw mode does not translate '\n'.
fn say(text: &str) {
    let mut stdout = io::stdout();
    for line in text.lines() {
        let _ = write!(stdout, "{}\r\n", line);
    }
    let _ = stdout.flush();
}

fn speech_options(options: &InteractiveOptions) -> SpeechOptions {
    SpeechOptions::new()
        .on_speaking_change(|speaking| say(if speaking { "Robot is speaking..." } else { "Robot is quiet." }))
        .on_pose_change(|pose| say(&format!("Pose: {}", pose)))
        .poses(options.poses.clone())
        .idle_pose(options.idle_pose.clone())
}

/// Reads keys on a blocking thread until `stop` is set or the receiver goes away.
fn spawn_key_reader(stop: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<KeyAction> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        while !stop.load(Ordering::SeqCst) {
            if !event::poll(KEY_POLL_INTERVAL)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = key_action(key.code, key.modifiers) {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
            }
        }
        Ok(())
    });
    rx
}

/// Runs the key loop until a quit key. Speech is stopped on the way out.
pub async fn run_interactive(gestures: &Gestures, options: InteractiveOptions) -> io::Result<()> {
    let _raw = RawModeGuard::enable()?;
    say("h=hover c=click g=greet n=name s=stop speech x=stop hover v=voices o=sounds b=badges q=quit");

    let stop = Arc::new(AtomicBool::new(false));
    let mut keys = spawn_key_reader(stop.clone());
    let mut events = gestures.coordinator().subscribe();

    loop {
        tokio::select! {
            key = keys.recv() => {
                let Some(action) = key else {
                    warn!(target: LOG_TARGET, "Key reader stopped.");
                    break;
                };
                debug!(target: LOG_TARGET, "Key action: {:?}", action);
                if action == KeyAction::Quit {
                    break;
                }
                handle_action(gestures, &options, action).await;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = format_event(&event) {
                        say(&line);
                    }
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    }

    stop.store(true, Ordering::SeqCst);
    gestures.coordinator().stop_primary(SpeechOptions::new());
    gestures.coordinator().stop_hover();
    Ok(())
}

async fn handle_action(gestures: &Gestures, options: &InteractiveOptions, action: KeyAction) {
    let coordinator = gestures.coordinator();
    match action {
        KeyAction::Hover => gestures.hover(),
        KeyAction::Click => gestures.click(),
        KeyAction::Greet => coordinator.play_primary(options.greeting.clone(), speech_options(options)),
        KeyAction::Name => coordinator.play_name(options.name.clone()),
        KeyAction::StopSpeech => coordinator.stop_primary(
            SpeechOptions::new()
                .on_pose_change(|pose| say(&format!("Pose: {}", pose)))
                .idle_pose(options.idle_pose.clone()),
        ),
        KeyAction::StopHover => coordinator.stop_hover(),
        KeyAction::ToggleVoices | KeyAction::ToggleSounds => {
            let toggled = if action == KeyAction::ToggleVoices {
                gestures.toggle_voices().await
            } else {
                gestures.toggle_sounds().await
            };
            match toggled {
                Ok(_) => say(&format_settings(&gestures.progress().load())),
                Err(e) => say(&format!("Could not save settings: {}", e)),
            }
        }
        KeyAction::ShowBadges => say(&format_badges(&gestures.progress().load())),
        KeyAction::Quit => {}
    }
}
