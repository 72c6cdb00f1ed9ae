use crate::audio::{
    alsa_handler::AlsaPcmHandler,
    backend::{PlaybackBackend, PlaybackOutcome, SoundControl, SoundHandle, SoundId, SoundRequest},
    decoder::FileDecoder,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task;
use tracing::{debug, info, instrument, trace, warn};

const LOG_TARGET: &str = "reflectobot::audio::alsa_backend";

/// Largest slice handed to one `writei` call.
const WRITE_CHUNK_FRAMES: usize = 4096;

/// Plays local files through ALSA, one PCM handle and one blocking thread per sound.
#[derive(Debug, Clone)]
pub struct AlsaBackend {
    device_name: String,
    assets_dir: PathBuf,
}

impl AlsaBackend {
    pub fn new(device_name: &str, assets_dir: impl Into<PathBuf>) -> Self {
        let assets_dir = assets_dir.into();
        info!(target: LOG_TARGET, "Creating ALSA backend for device '{}' (assets: {})", device_name, assets_dir.display());
        Self {
            device_name: device_name.to_string(),
            assets_dir,
        }
    }

    /// Maps a sound locator onto a file. Absolute paths that exist are used
    /// as-is; anything else (e.g. `/audio/buttons.mp3`) is resolved under the
    /// assets directory.
    pub fn resolve_source(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() && path.exists() {
            return path.to_path_buf();
        }
        self.assets_dir.join(src.trim_start_matches('/'))
    }
}

struct AlsaSoundControl {
    id: SoundId,
    stop: Arc<AtomicBool>,
}

impl SoundControl for AlsaSoundControl {
    fn halt(&mut self) {
        trace!(target: LOG_TARGET, id = %self.id, "Halt requested.");
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl PlaybackBackend for AlsaBackend {
    #[instrument(skip(self), fields(id = %request.id, kind = %request.kind))]
    fn start(&self, request: SoundRequest) -> SoundHandle {
        let (done_tx, done_rx) = oneshot::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let path = self.resolve_source(&request.src);
        let device_name = self.device_name.clone();
        let task_stop = stop.clone();

        debug!(target: LOG_TARGET, "Starting {} from {}", request.id, path.display());
        task::spawn_blocking(move || {
            let outcome = play_file(&path, &device_name, request.volume, &task_stop);
            // The receiver is gone when the sound was halted or released.
            let _ = done_tx.send(outcome);
        });

        SoundHandle::new(Box::new(AlsaSoundControl { id: request.id, stop }), done_rx)
    }
}

/// Decodes `path` and writes it to a fresh PCM until end of stream or `stop`.
fn play_file(path: &Path, device_name: &str, volume: f32, stop: &AtomicBool) -> PlaybackOutcome {
    let mut decoder = FileDecoder::open(path)?;
    let mut handler = AlsaPcmHandler::new(device_name);
    handler.initialize(decoder.spec())?;
    let channels = handler.channels().max(1);

    while let Some(samples) = decoder.next_chunk(volume)? {
        let total_frames = samples.len() / channels;
        let mut offset = 0;
        while offset < total_frames {
            if stop.load(Ordering::SeqCst) {
                trace!(target: LOG_TARGET, "Stop flag observed, dropping PCM.");
                handler.close();
                return Ok(());
            }
            let frames = (total_frames - offset).min(WRITE_CHUNK_FRAMES);
            let chunk = &samples[offset * channels..(offset + frames) * channels];
            match handler.write_s16_buffer(chunk)? {
                0 => continue,
                written => offset += written.min(frames),
            }
        }
    }

    if stop.load(Ordering::SeqCst) {
        handler.close();
        return Ok(());
    }
    if let Err(e) = handler.drain() {
        warn!(target: LOG_TARGET, "Drain failed at end of stream: {}", e);
    }
    Ok(())
}
