use std::time::Duration as StdDuration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Time each speaking pose stays on screen.
pub const POSE_INTERVAL: StdDuration = StdDuration::from_millis(500);

/// Cycles through a pose sequence on a fixed interval while the robot speaks.
#[derive(Debug)]
pub struct PoseAnimation {
    sequence: Vec<String>,
    index: usize,
    ticker: Interval,
}

impl PoseAnimation {
    /// Returns `None` for an empty sequence. The caller applies [`Self::current`]
    /// immediately; the first tick fires one interval later.
    pub fn start(sequence: Vec<String>) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        let mut ticker = interval_at(Instant::now() + POSE_INTERVAL, POSE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(Self {
            sequence,
            index: 0,
            ticker,
        })
    }

    pub fn current(&self) -> &str {
        &self.sequence[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Waits for the next tick, then moves to the next pose (wrapping).
    /// Cancel-safe: the index only moves once a tick has completed.
    pub async fn next_pose(&mut self) -> String {
        self.ticker.tick().await;
        self.index = (self.index + 1) % self.sequence.len();
        self.current().to_string()
    }
}
