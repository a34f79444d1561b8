use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::SystemTime;

/// Source of wall-clock time for timeouts.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The host's clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct System;

impl Clock for System {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct Manual {
    millis: AtomicU64,
}

impl Manual {
    pub fn new(start: SystemTime) -> Self {
        Self {
            millis: AtomicU64::new(crate::millis(start)),
        }
    }
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
    pub fn set(&self, to: SystemTime) {
        self.millis.store(crate::millis(to), Ordering::SeqCst);
    }
}

impl Clock for Manual {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
