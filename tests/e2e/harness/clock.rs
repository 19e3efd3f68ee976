use jpmatch_core::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Controllable time for polling tests.
///
/// Clones share the same instant. Passed to `Eventually::with_clock`, every
/// poll interval advances the clock instead of sleeping, so the fake cluster
/// sees rollouts progress without real waiting.
#[derive(Clone, Default)]
pub struct MockClock {
    current_ms: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a new mock clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by duration
    pub fn advance(&self, duration: Duration) {
        self.current_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.current_ms.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
