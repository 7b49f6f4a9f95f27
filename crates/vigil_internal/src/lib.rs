//! # Vigil Internal Library
//!
//! Re-exports the core Vigil crates for convenience.

/// Lifecycle event registry.
pub use vigil_registry;

/// Module runtime that fires lifecycle phases.
pub use vigil_runtime;

/// Infrastructure modules.
pub use vigil_core_modules;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vigil_core_modules::{DefaultModules, MinimalModules, ProbeModule, TracingModule};
    pub use vigil_registry::prelude::*;
    pub use vigil_runtime::prelude::*;
}
