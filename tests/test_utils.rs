//! Common utilities for ReflectoBot integration tests
//!
//! This module provides shared functionality across all test types.

use reflectobot::audio::{AudioError, PlaybackBackend, SoundControl, SoundHandle, SoundId, SoundRequest};
use reflectobot::progress::Progress;
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Writes `progress` as a session file at `path`.
#[allow(dead_code)]
pub fn write_progress<P: AsRef<Path>>(path: P, progress: &Progress) -> Result<(), Box<dyn Error>> {
    fs::write(path, serde_json::to_string_pretty(progress)?)?;
    Ok(())
}

struct TimedControl {
    id: SoundId,
    task: JoinHandle<()>,
    halted: Arc<Mutex<Vec<SoundId>>>,
}

impl SoundControl for TimedControl {
    fn halt(&mut self) {
        self.task.abort();
        self.halted.lock().unwrap().push(self.id);
    }
}

/// Backend whose sounds end on their own after a fixed length.
///
/// Sources starting with `missing` fail right away, like an unreadable file.
#[allow(dead_code)]
pub struct TimedBackend {
    lengths: HashMap<String, Duration>,
    default_length: Duration,
    started: Arc<Mutex<Vec<SoundRequest>>>,
    halted: Arc<Mutex<Vec<SoundId>>>,
}

#[allow(dead_code)]
impl TimedBackend {
    pub fn new(default_length: Duration) -> Self {
        Self {
            lengths: HashMap::new(),
            default_length,
            started: Arc::new(Mutex::new(Vec::new())),
            halted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_length(mut self, src: &str, length: Duration) -> Self {
        self.lengths.insert(src.to_string(), length);
        self
    }

    pub fn started(&self) -> Vec<SoundRequest> {
        self.started.lock().unwrap().clone()
    }

    pub fn halted(&self) -> Vec<SoundId> {
        self.halted.lock().unwrap().clone()
    }
}

impl PlaybackBackend for TimedBackend {
    fn start(&self, request: SoundRequest) -> SoundHandle {
        let (tx, rx) = oneshot::channel();
        let length = self.lengths.get(&request.src).copied().unwrap_or(self.default_length);
        let fails = request.src.starts_with("missing");
        let id = request.id;
        self.started.lock().unwrap().push(request);

        let task = tokio::spawn(async move {
            if fails {
                let _ = tx.send(Err(AudioError::IoError(io::Error::new(io::ErrorKind::NotFound, "no such file"))));
                return;
            }
            tokio::time::sleep(length).await;
            let _ = tx.send(Ok(()));
        });

        SoundHandle::new(
            Box::new(TimedControl {
                id,
                task,
                halted: self.halted.clone(),
            }),
            rx,
        )
    }
}
