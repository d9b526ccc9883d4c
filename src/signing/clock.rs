//! Time sources for URL issuance.
//!
//! Signers never read the wall clock themselves. The caller takes one reading
//! per request and hands it to the signer, which keeps the expiry and the
//! signed payload consistent and makes signing reproducible under a fixed clock.

use std::fmt::Debug;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of the current instant.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(SystemTime);

impl FixedClock {
    pub fn new(instant: SystemTime) -> Self {
        Self(instant)
    }

    /// Freeze the clock at the given Unix timestamp (seconds).
    pub fn at_epoch_secs(secs: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
