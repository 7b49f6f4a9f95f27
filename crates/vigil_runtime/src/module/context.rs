//! Context handed to module hooks.

use vigil_registry::LifecyclePhase;

/// Information about the phase currently being fired.
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    module_id: &'a str,
    phase: LifecyclePhase,
    dependencies: &'a [String],
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(
        module_id: &'a str,
        phase: LifecyclePhase,
        dependencies: &'a [String],
    ) -> Self {
        Self {
            module_id,
            phase,
            dependencies,
        }
    }

    /// Id of the module the hook belongs to.
    #[must_use]
    pub fn module_id(&self) -> &'a str {
        self.module_id
    }

    /// The phase being fired.
    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// The module's declared dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &'a [String] {
        self.dependencies
    }
}
