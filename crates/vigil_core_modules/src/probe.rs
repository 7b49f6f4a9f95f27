//! A module with no behavior of its own.

use vigil_runtime::module::{Module, ModuleContext};

/// A module with a caller-chosen id and dependencies that only logs.
///
/// Useful for wiring runtimes in tests and demos, where the interesting part
/// is the order in which phases fire rather than what the module does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeModule {
    id: String,
    dependencies: Vec<String>,
}

impl ProbeModule {
    /// Creates a probe with the given id and no dependencies.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a dependency on the module with id `dependency`.
    #[must_use]
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    fn trace(ctx: &ModuleContext<'_>) {
        tracing::trace!(module_id = ctx.module_id(), phase = %ctx.phase(), "probe");
    }
}

impl Module for ProbeModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn will_refresh_context(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }

    fn context_refreshed(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }

    fn will_start(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }

    fn started(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }

    fn will_stop(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }

    fn stopped(&self, ctx: &ModuleContext<'_>) {
        Self::trace(ctx);
    }
}
