//! A minimal module runtime for Vigil.
//!
//! `vigil_runtime` drives loadable modules through the six lifecycle phases
//! defined by [`vigil_registry`] and reports every fired phase to its
//! observers. Pair it with a [`LifecycleRegistry`](vigil_registry::LifecycleRegistry)
//! to assert afterwards how often, and when, each phase fired.
//!
//! - [`module`] - Module trait and module groups
//! - [`runtime`] - Runtime that orders modules and fires phases
//! - [`RuntimeError`] - Errors for invalid lifecycle requests
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vigil_registry::{LifecyclePhase, LifecycleRegistry};
//! use vigil_runtime::prelude::*;
//!
//! struct Storage;
//!
//! impl Module for Storage {
//!     fn id(&self) -> &str {
//!         "storage"
//!     }
//! }
//!
//! let registry = Arc::new(LifecycleRegistry::new());
//! registry.init("storage");
//!
//! let mut runtime = ModuleRuntime::new().with_observer(registry.clone());
//! runtime.add_modules(Storage)?;
//! runtime.start()?;
//!
//! assert_eq!(registry.count(LifecyclePhase::WillStart, "storage"), 1);
//! assert_eq!(registry.count(LifecyclePhase::Started, "storage"), 1);
//! assert_eq!(registry.count(LifecyclePhase::Stopped, "storage"), 0);
//! # Ok::<(), RuntimeError>(())
//! ```

mod error;

/// Loadable modules and module groups.
pub mod module;

/// Runtime that orders modules and fires lifecycle phases.
pub mod runtime;

pub use error::RuntimeError;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::RuntimeError;
    pub use crate::module::*;
    pub use crate::runtime::*;
}
