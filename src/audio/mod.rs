//! Audio output: the backend trait the coordinator drives and its ALSA implementation

mod alsa_backend;
mod alsa_handler;
mod backend;
mod decoder;
mod error;

pub use alsa_backend::AlsaBackend;
pub use backend::{PlaybackBackend, PlaybackOutcome, SoundControl, SoundHandle, SoundId, SoundKind, SoundRequest};
pub use decoder::apply_volume;
pub use error::AudioError;
