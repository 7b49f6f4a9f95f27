//! Core infrastructure modules for Vigil.
//!
//! This crate provides modules most Vigil applications want:
//!
//! - [`TracingModule`] - Logging and observability via the `tracing` crate
//! - [`ProbeModule`] - A behavior-free module for wiring and test fixtures
//! - [`DefaultModules`] - Bundle of the infrastructure modules
//! - [`MinimalModules`] - Empty bundle for headless or test runtimes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vigil_core_modules::{DefaultModules, ProbeModule};
//! use vigil_registry::LifecycleRegistry;
//! use vigil_runtime::module::ModuleGroup;
//! use vigil_runtime::runtime::ModuleRuntime;
//!
//! let registry = Arc::new(LifecycleRegistry::new());
//! let mut runtime = ModuleRuntime::new().with_observer(registry.clone());
//! runtime
//!     .add_modules(DefaultModules.build())?
//!     .add_modules(ProbeModule::new("audit").with_dependency("vigil::tracing"))?;
//!
//! runtime.refresh_context()?;
//! runtime.start()?;
//!
//! assert_eq!(registry.started_count("audit"), 1);
//! # Ok::<(), vigil_runtime::RuntimeError>(())
//! ```

mod probe;
mod tracing_module;

pub use probe::ProbeModule;
pub use tracing_module::{TracingConfig, TracingFormat, TracingModule};

use vigil_runtime::module::{ModuleGroup, ModuleGroupBuilder};

/// Default modules for most Vigil applications.
///
/// Includes:
/// - [`TracingModule`] - Logging and observability
///
/// # Customization
///
/// ```
/// use vigil_core_modules::{DefaultModules, TracingModule};
/// use vigil_runtime::module::ModuleGroup;
///
/// let group = DefaultModules.build().disable(TracingModule::ID);
/// assert!(group.is_empty());
/// ```
pub struct DefaultModules;

impl ModuleGroup for DefaultModules {
    fn build(self) -> ModuleGroupBuilder {
        ModuleGroupBuilder::new().add(TracingModule::default())
    }
}

/// Minimal modules for headless or testing scenarios.
///
/// Contains nothing. Does not install a subscriber, making it suitable for
/// tests that don't need logging output.
pub struct MinimalModules;

impl ModuleGroup for MinimalModules {
    fn build(self) -> ModuleGroupBuilder {
        ModuleGroupBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_runtime::runtime::ModuleRuntime;

    #[test]
    fn default_modules_builds() {
        let builder = DefaultModules.build();
        assert_eq!(builder.ids(), vec![TracingModule::ID]);
    }

    #[test]
    fn minimal_modules_builds() {
        assert!(MinimalModules.build().is_empty());
    }

    #[test]
    fn runtime_with_minimal_modules() {
        let mut runtime = ModuleRuntime::new();
        runtime.add_modules(MinimalModules.build()).unwrap();

        assert_eq!(runtime.start().unwrap(), 0);
        assert!(runtime.is_empty());
    }
}
