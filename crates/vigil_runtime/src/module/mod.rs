//! Loadable modules and module groups.
//!
//! A [`Module`] is the unit the runtime drives through its lifecycle. Each
//! module has a string id, may depend on other modules by id, and may react to
//! any of the six lifecycle phases.
//!
//! # Example
//!
//! ```
//! use vigil_runtime::module::{Module, ModuleContext};
//! use vigil_runtime::runtime::ModuleRuntime;
//!
//! struct Storage;
//!
//! impl Module for Storage {
//!     fn id(&self) -> &str {
//!         "storage"
//!     }
//! }
//!
//! struct Web;
//!
//! impl Module for Web {
//!     fn id(&self) -> &str {
//!         "web"
//!     }
//!
//!     fn dependencies(&self) -> Vec<String> {
//!         vec!["storage".into()]
//!     }
//!
//!     fn started(&self, ctx: &ModuleContext<'_>) {
//!         assert_eq!(ctx.module_id(), "web");
//!     }
//! }
//!
//! let mut runtime = ModuleRuntime::new();
//! runtime.add_modules(Web)?.add_modules(Storage)?;
//! runtime.start()?;
//! # Ok::<(), vigil_runtime::RuntimeError>(())
//! ```

mod context;

pub use context::ModuleContext;

use crate::error::RuntimeError;
use crate::runtime::ModuleRuntime;

// ─────────────────────────────────────────────────────────────────────────────
// Module Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A loadable module driven through the lifecycle by a [`ModuleRuntime`].
///
/// The runtime fires hooks in this order:
///
/// 1. **Refresh** - `will_refresh_context()` on every module, then
///    `context_refreshed()` on every module, in dependency order
/// 2. **Start** - `will_start()` then `started()` per module, in dependency order
/// 3. **Stop** - `will_stop()` then `stopped()` per module, in **reverse**
///    dependency order
///
/// After each hook returns, every observer registered with the runtime is
/// told which phase fired for which module.
pub trait Module: Send + Sync + 'static {
    /// The module identifier.
    ///
    /// Compared exactly: no case folding, no trimming.
    fn id(&self) -> &str;

    /// Ids of modules that must start before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Called before the runtime refreshes its shared context.
    fn will_refresh_context(&self, _ctx: &ModuleContext<'_>) {}

    /// Called after the runtime refreshed its shared context.
    fn context_refreshed(&self, _ctx: &ModuleContext<'_>) {}

    /// Called before the module starts.
    fn will_start(&self, _ctx: &ModuleContext<'_>) {}

    /// Called once the module has started.
    fn started(&self, _ctx: &ModuleContext<'_>) {}

    /// Called before the module stops.
    fn will_stop(&self, _ctx: &ModuleContext<'_>) {}

    /// Called once the module has stopped.
    fn stopped(&self, _ctx: &ModuleContext<'_>) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Modules Trait (for add_modules polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for types that can be added to a runtime as modules.
///
/// This trait enables `runtime.add_modules()` to accept both:
/// - Single modules implementing [`Module`]
/// - Module groups via [`ModuleGroupBuilder`]
///
/// Users typically don't implement this trait directly.
pub trait Modules {
    /// Adds these modules to the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateModule`] if any id is already taken.
    /// Nothing is added in that case.
    fn add_to_runtime(self, runtime: &mut ModuleRuntime) -> Result<(), RuntimeError>;
}

impl<M: Module> Modules for M {
    fn add_to_runtime(self, runtime: &mut ModuleRuntime) -> Result<(), RuntimeError> {
        runtime.add_boxed(vec![Box::new(self)])
    }
}

impl Modules for ModuleGroupBuilder {
    fn add_to_runtime(self, runtime: &mut ModuleRuntime) -> Result<(), RuntimeError> {
        runtime.add_boxed(self.modules)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModuleGroup Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A collection of modules that can be added together.
///
/// # Example
///
/// ```ignore
/// pub struct DefaultModules;
///
/// impl ModuleGroup for DefaultModules {
///     fn build(self) -> ModuleGroupBuilder {
///         ModuleGroupBuilder::new()
///             .add(TracingModule::default())
///             .add(ProbeModule::new("audit"))
///     }
/// }
///
/// runtime.add_modules(DefaultModules.build().disable("audit"))?;
/// ```
pub trait ModuleGroup {
    /// Returns the modules in this group.
    fn build(self) -> ModuleGroupBuilder;
}

// ─────────────────────────────────────────────────────────────────────────────
// ModuleGroupBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for customizing module groups.
///
/// Allows adding and removing modules within a group, keyed by module id.
#[derive(Default)]
pub struct ModuleGroupBuilder {
    /// The modules in this group, in order.
    pub(crate) modules: Vec<Box<dyn Module>>,
}

impl ModuleGroupBuilder {
    /// Creates a new empty module group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Adds a module to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Removes the module with id `id` from the group.
    ///
    /// If the module is not found, this is a no-op.
    #[must_use]
    pub fn disable(mut self, id: &str) -> Self {
        self.modules.retain(|m| m.id() != id);
        self
    }

    /// Ids of the modules in the group, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    /// Returns the number of modules in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the group contains no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Module for Named {
        fn id(&self) -> &str {
            self.0
        }
    }

    struct Dependent;

    impl Module for Dependent {
        fn id(&self) -> &str {
            "dependent"
        }

        fn dependencies(&self) -> Vec<String> {
            vec!["a".into()]
        }
    }

    #[test]
    fn module_default_dependencies_empty() {
        assert!(Named("a").dependencies().is_empty());
    }

    #[test]
    fn module_with_dependencies() {
        assert_eq!(Dependent.dependencies(), vec!["a".to_string()]);
    }

    #[test]
    fn group_builder_add() {
        let builder = ModuleGroupBuilder::new().add(Named("a")).add(Named("b"));

        assert_eq!(builder.len(), 2);
        assert_eq!(builder.ids(), vec!["a", "b"]);
    }

    #[test]
    fn group_builder_disable() {
        let builder = ModuleGroupBuilder::new()
            .add(Named("a"))
            .add(Named("b"))
            .disable("a");

        assert_eq!(builder.ids(), vec!["b"]);
    }

    #[test]
    fn group_disable_nonexistent_is_noop() {
        let builder = ModuleGroupBuilder::new().add(Named("a")).disable("c");

        assert_eq!(builder.ids(), vec!["a"]);
    }

    struct TestGroup;

    impl ModuleGroup for TestGroup {
        fn build(self) -> ModuleGroupBuilder {
            ModuleGroupBuilder::new().add(Named("a")).add(Dependent)
        }
    }

    #[test]
    fn group_build() {
        let builder = TestGroup.build();
        assert_eq!(builder.len(), 2);
        assert!(!builder.is_empty());
    }

    #[test]
    fn group_empty() {
        let builder = ModuleGroupBuilder::new();

        assert!(builder.is_empty());
        assert_eq!(builder.len(), 0);
    }
}
