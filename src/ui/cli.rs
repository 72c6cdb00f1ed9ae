//! Command-line interface implementation

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;

use crate::config::Settings;
use crate::coordinator::{CoordinatorEvent, SpeechOptions};
use crate::progress::{Progress, ALL_BADGES};

/// Command-line arguments for reflectobot
#[derive(Parser, Debug)]
#[command(author, version, about = "ReflectoBot audio and progress CLI", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, env = "REFLECTOBOT_CONFIG")]
    pub config: Option<String>,

    /// ALSA device to use
    #[arg(short = 'd', long, global = true, env = "REFLECTOBOT_ALSA_DEVICE")]
    pub alsa_device: Option<String>,

    /// Directory sound files are resolved against
    #[arg(short, long, global = true, env = "REFLECTOBOT_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Progress file holding toggles and badges
    #[arg(short, long, global = true, env = "REFLECTOBOT_PROGRESS_FILE")]
    pub progress_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Play robot speech while cycling poses
    Greet {
        file: String,
        /// Poses shown while speaking, comma separated
        #[arg(long, value_delimiter = ',')]
        poses: Vec<String>,
        /// Pose restored when the speech ends
        #[arg(long)]
        idle: Option<String>,
    },
    /// Play the hover sound
    Hover { file: Option<String> },
    /// Play the click sound
    Click { file: Option<String> },
    /// Play the robot's name
    Name { file: String },
    /// Show the sound toggles
    Settings,
    /// Flip a sound toggle
    Toggle { target: ToggleTarget },
    /// Show collected badges
    Badges,
    /// Save the session to a file
    Export { path: PathBuf },
    /// Load a session file
    Import { path: PathBuf },
    /// Clear one earned badge
    ResetBadge { id: String },
    /// Jump to a challenge
    SkipTo { id: String },
    /// Erase all progress
    Erase,
    /// Drive the robot from the keyboard
    Interactive {
        /// Speech played by `g`
        #[arg(long, default_value = "greeting.mp3")]
        greeting: String,
        /// Sound played by `n`
        #[arg(long, default_value = "robot-name.mp3")]
        name: String,
        #[arg(long, value_delimiter = ',')]
        poses: Vec<String>,
        #[arg(long, default_value = "idle")]
        idle: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Voices,
    Sounds,
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli { args: Args::parse() }
    }

    /// Applies command-line overrides on top of the config file.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(device) = &self.args.alsa_device {
            settings.alsa_device = device.clone();
        }
        if let Some(dir) = &self.args.assets_dir {
            settings.assets_dir = dir.clone();
        }
        if let Some(file) = &self.args.progress_file {
            settings.progress_file = Some(file.clone());
        }
    }

    pub fn display_settings(&self, progress: &Progress) {
        print!("{}", format_settings(progress));
    }

    pub fn display_badges(&self, progress: &Progress) {
        print!("{}", format_badges(progress));
    }

    /// Display an error message
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub fn format_settings(progress: &Progress) -> String {
    format!(
        "Robot voices: {}\nButton sounds: {}\n",
        on_off(progress.voices_enabled),
        on_off(progress.sounds_enabled)
    )
}

/// The badge page: counter line, then one row per badge in challenge order.
pub fn format_badges(progress: &Progress) -> String {
    let mut out = format!("{} of {} Collected!\n", progress.badge_count, ALL_BADGES.len());
    for badge in ALL_BADGES.iter() {
        let mark = if progress.is_earned(badge.id) { "[x]" } else { "[ ]" };
        out.push_str(&format!("{} {:<20} {}\n", mark, badge.name, badge.id));
    }
    if let Some(challenge) = &progress.current_challenge {
        out.push_str(&format!("Current challenge: {}\n", challenge));
    }
    out
}

/// One status line per interesting coordinator event.
pub fn format_event(event: &CoordinatorEvent) -> Option<String> {
    match event {
        CoordinatorEvent::Failed { kind, src, reason, .. } => {
            Some(format!("Could not play {} '{}': {}", kind, src, reason))
        }
        CoordinatorEvent::Suppressed { kind, src } => Some(format!("Skipped {} '{}' (turned off)", kind, src)),
        _ => None,
    }
}

/// Speech options that print speaking and pose changes to stdout.
pub fn printing_speech_options(poses: Vec<String>, idle: Option<String>) -> SpeechOptions {
    let mut options = SpeechOptions::new()
        .on_speaking_change(|speaking| {
            println!("{}", if speaking { "Robot is speaking..." } else { "Robot is quiet." });
        })
        .on_pose_change(|pose| println!("Pose: {}", pose))
        .poses(poses);
    if let Some(idle) = idle {
        options = options.idle_pose(idle);
    }
    options
}
