use std::error::Error;
use std::io;
use symphonia::core::errors::Error as SymphoniaError;

/// Ways a single sound can fail to open or play.
///
/// None of these ever reach the presentation layer: the coordinator logs them
/// and treats the resource as finished.
#[derive(Debug)]
pub enum AudioError {
    /// Opening, configuring or writing the PCM device failed.
    AlsaError(String),
    /// Probing or decoding the file failed.
    SymphoniaError(SymphoniaError),
    /// The file could not be read.
    IoError(io::Error),
    /// The device name could not be passed to ALSA.
    InitializationError(String),
    /// Samples written before the device was opened.
    InvalidState(String),
    /// No playable track, or the stream changed shape mid-file.
    UnsupportedFormat(String),
    MissingCodecParams(&'static str),
    /// The backend dropped a completion channel without reporting an outcome.
    Interrupted,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::AlsaError(e) => write!(f, "ALSA error: {}", e),
            AudioError::SymphoniaError(e) => write!(f, "Decoder error: {}", e),
            AudioError::IoError(e) => write!(f, "I/O error: {}", e),
            AudioError::InitializationError(e) => write!(f, "Device setup failed: {}", e),
            AudioError::InvalidState(s) => write!(f, "Invalid state: {}", s),
            AudioError::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            AudioError::MissingCodecParams(s) => write!(f, "File does not declare its {}", s),
            AudioError::Interrupted => write!(f, "Playback interrupted: completion channel closed"),
        }
    }
}

impl Error for AudioError {}

impl From<alsa::Error> for AudioError {
    fn from(e: alsa::Error) -> Self {
        AudioError::AlsaError(e.to_string())
    }
}

impl From<SymphoniaError> for AudioError {
    fn from(e: SymphoniaError) -> Self {
        AudioError::SymphoniaError(e)
    }
}

impl From<io::Error> for AudioError {
    fn from(e: io::Error) -> Self {
        AudioError::IoError(e)
    }
}
