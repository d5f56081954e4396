use std::time::{Duration, Instant};

/// Enforces a minimum interval between accepted detections.
///
/// The gate only holds the time of the last accepted detection; the interval itself comes
/// from the thresholds in force when it is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceGate {
    last_accepted: Option<Instant>,
}

impl DebounceGate {
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// True if nothing has been accepted yet, or at least `min_interval` has passed since.
    pub fn allow(&self, now: Instant, min_interval: Duration) -> bool {
        match self.last_accepted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= min_interval,
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}
