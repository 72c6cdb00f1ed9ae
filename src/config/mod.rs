//! Configuration file handling

mod settings;

pub use settings::{ConfigError, Settings};
