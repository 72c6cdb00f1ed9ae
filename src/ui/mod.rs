//! Terminal front end: one-shot commands and the interactive key loop

mod cli;
mod gestures;
mod interactive;

pub use cli::{
    format_badges, format_event, format_settings, printing_speech_options, Args, Cli, Command, ToggleTarget,
};
pub use gestures::Gestures;
pub use interactive::{key_action, run_interactive, InteractiveOptions, KeyAction};
