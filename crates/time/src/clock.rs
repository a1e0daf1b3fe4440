use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time, in seconds since UNIX_EPOCH.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Reference-counted clock handle shared between the registry and its callers.
pub type SharedClock = Arc<dyn Clock>;

fn system_time_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Wall-clock time that never moves backwards.
///
/// If the system clock is stepped back, the last emitted value is repeated
/// until the system clock catches up again.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_secs: Mutex<u64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        let mut last = self.last_secs.lock();
        let now = system_time_now_secs().max(*last);
        *last = now;
        now
    }
}

/// Clock driven explicitly by its owner.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_secs: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now_secs: AtomicU64::new(start),
        }
    }

    pub fn set(&self, secs: u64) {
        self.now_secs.store(secs, Ordering::SeqCst);
    }

    /// Move the clock forward, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) -> u64 {
        let mut current = self.now_secs.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(secs);
            match self.now_secs.compare_exchange(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_secs.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(first > 0);
        assert!(second >= first);
    }

    #[test]
    fn system_clock_holds_last_value_when_rewound() {
        let clock = SystemClock::new();
        *clock.last_secs.lock() = u64::MAX - 1;
        assert_eq!(clock.now(), u64::MAX - 1);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.advance(5), 1_005);
        clock.set(42);
        assert_eq!(clock.now(), 42);
        clock.set(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }

    #[test]
    fn shared_handle_reads_through() {
        let manual = Arc::new(ManualClock::new(7));
        let shared: SharedClock = manual.clone();
        manual.advance(3);
        assert_eq!(shared.now(), 10);
    }
}
