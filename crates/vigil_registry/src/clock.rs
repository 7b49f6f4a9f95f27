//! Wall-clock sources for stamping recorded events.
//!
//! The registry reads the current time through a [`WallClock`] so tests can
//! substitute a controllable clock. [`SystemWallClock`] is the default.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{SystemTime, UNIX_EPOCH, Duration};
//! use vigil_registry::{LifecycleRegistry, WallClock};
//!
//! /// A clock that always returns the same instant.
//! struct FixedClock(SystemTime);
//!
//! impl WallClock for FixedClock {
//!     fn now(&self) -> SystemTime {
//!         self.0
//!     }
//! }
//!
//! let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
//! let registry = LifecycleRegistry::with_clock(Arc::new(FixedClock(at)));
//! ```

use std::time::SystemTime;

/// Trait for providing the current wall-clock time.
pub trait WallClock: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> SystemTime;
}

/// Clock backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockWallClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::{Duration, UNIX_EPOCH};
/// use vigil_registry::{LifecycleRegistry, MockWallClock};
///
/// let clock = Arc::new(MockWallClock::new(UNIX_EPOCH + Duration::from_secs(10)));
/// let registry = LifecycleRegistry::with_clock(clock.clone());
///
/// clock.advance(Duration::from_secs(5));
/// ```
#[cfg(any(test, feature = "test-utils"))]
pub struct MockWallClock {
    current: parking_lot::RwLock<SystemTime>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockWallClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: SystemTime) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: std::time::Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: SystemTime) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> SystemTime {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl WallClock for MockWallClock {
    fn now(&self) -> SystemTime {
        self.current()
    }
}
