use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current unix time in seconds, `block.timestamp` for the
/// verifier.
pub trait Clock {
    fn now(&self) -> u64;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Always reports the same time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
