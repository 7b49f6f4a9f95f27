//! Lifecycle event registry for Vigil.
//!
//! `vigil_registry` records how many times each lifecycle phase fired for each
//! loadable module, and when it last fired. Module runtimes report phases into
//! it; tests and diagnostics read them back.
//!
//! - [`LifecyclePhase`] - The six phases of a module lifecycle
//! - [`LifecycleRegistry`] - The thread-safe registry itself
//! - [`LifecycleObserver`] - Hook a runtime calls for every fired phase
//! - [`LastOccurrence`] - Absent / epoch / recorded timestamp query result
//! - [`WallClock`] - Time source, mockable with the `test-utils` feature
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vigil_registry::{LifecyclePhase, LifecycleRegistry};
//!
//! let registry = Arc::new(LifecycleRegistry::new());
//!
//! // Never initialized: recording starts from zero.
//! registry.record(LifecyclePhase::Stopped, "moduleB");
//! assert_eq!(registry.count(LifecyclePhase::Stopped, "moduleB"), 1);
//! ```
//!
//! # Feature Flags
//!
//! - `test-utils` - Enables [`MockWallClock`] for deterministic timestamps

mod clock;
mod phase;
mod record;
mod registry;

pub use clock::{SystemWallClock, WallClock};
pub use phase::{LifecyclePhase, ParsePhaseError};
pub use record::{EventRecord, LastOccurrence, ModuleId, ModuleSnapshot, PhaseSnapshot};
pub use registry::{LifecycleObserver, LifecycleRegistry};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockWallClock;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{
        LastOccurrence, LifecycleObserver, LifecyclePhase, LifecycleRegistry, ModuleId,
        ModuleSnapshot,
    };
}
