//! Cancellable scheduling policy, expressed as plain counters.
//!
//! Timers themselves live in spawned futures (see the console view);
//! these gates decide whether a timer that fires, or a response that
//! lands, is still the current one. Cancellation is cooperative: a new
//! edit does not tear the old timer down, it just invalidates the
//! generation the timer will present when it fires.

/// Preview quiescence window: a burst of edits fires one call, using the
/// values present when the last edit's window elapses.
pub const PREVIEW_DEBOUNCE_MS: u64 = 500;

/// Notification banners dismiss themselves after this long.
pub const NOTICE_DISMISS_MS: u64 = 5_000;

/// Trailing-edge debounce: each edit bumps the generation, and only a
/// timer carrying the newest generation is allowed to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceGate {
    generation: u64,
}

impl DebounceGate {
    /// Record an edit; the returned generation belongs to the timer
    /// scheduled for it.
    pub fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Monotonic request sequencing: responses apply only if they belong to
/// the latest issued request. This makes the "last response wins" race
/// on the shared chart an explicit, testable policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeqGate {
    issued: u64,
}

impl SeqGate {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.issued == seq
    }
}
