use crate::audio::{PlaybackOutcome, SoundHandle, SoundId, SoundKind};

/// A resource the coordinator created and still owns.
#[derive(Debug)]
pub struct ActiveSound {
    pub id: SoundId,
    pub kind: SoundKind,
    pub src: String,
    handle: SoundHandle,
}

impl ActiveSound {
    pub fn new(id: SoundId, kind: SoundKind, src: String, handle: SoundHandle) -> Self {
        Self { id, kind, src, handle }
    }

    pub async fn completion(&mut self) -> PlaybackOutcome {
        self.handle.completion().await
    }

    /// Stops the resource and returns what it was, for logging.
    pub fn halt(self) -> (SoundId, SoundKind, String) {
        self.handle.halt();
        (self.id, self.kind, self.src)
    }
}

/// Holds at most one active resource.
#[derive(Debug, Default)]
pub struct PlaybackSlot {
    occupant: Option<ActiveSound>,
}

impl PlaybackSlot {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn src(&self) -> Option<&str> {
        self.occupant.as_ref().map(|sound| sound.src.as_str())
    }

    /// Puts `sound` in the slot. The slot must have been emptied first.
    pub fn occupy(&mut self, sound: ActiveSound) {
        debug_assert!(self.occupant.is_none(), "slot occupied while starting {}", sound.id);
        self.occupant = Some(sound);
    }

    /// Halts and releases the occupant, if any.
    pub fn halt(&mut self) -> Option<(SoundId, SoundKind, String)> {
        self.occupant.take().map(ActiveSound::halt)
    }

    /// Releases the occupant without halting it (it already ended).
    pub fn release(&mut self) -> Option<ActiveSound> {
        self.occupant.take()
    }

    /// Resolves with the occupant's outcome; never resolves while empty.
    pub async fn completion(&mut self) -> PlaybackOutcome {
        match self.occupant.as_mut() {
            Some(sound) => sound.completion().await,
            None => std::future::pending().await,
        }
    }
}
