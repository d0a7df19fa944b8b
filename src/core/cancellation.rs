use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cheap cooperative cancellation flag, checked at the documented
/// suspension points rather than threaded through every call frame.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken { flag: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clears a previously-set flag so the same token can be reused for the
    /// next batch.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock deadline derived from `Query::TimeOutLimitMilliseconds`.
/// Scoring loops have no cooperative yield points of their own; a deadline
/// check substitutes for one at the top of each candidate batch.
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn from_millis(millis: u32) -> Self {
        let clamped = millis.min(10_000);
        if clamped == 0 {
            Deadline { at: None }
        } else {
            Deadline { at: Some(Instant::now() + Duration::from_millis(clamped as u64)) }
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}
