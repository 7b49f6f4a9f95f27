//! Error types for module runtime operations.

use thiserror::Error;

/// Errors returned when the runtime is asked to do something its modules do
/// not allow.
///
/// Every error is returned before any hook of the failing operation fires for
/// the offending module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A module with the same id was already added.
    #[error("module '{0}' was already added")]
    DuplicateModule(String),

    /// A module depends on an id that was never added.
    #[error("module '{module}' requires '{dependency}' which was not added")]
    MissingDependency {
        /// The module declaring the dependency.
        module: String,
        /// The missing dependency.
        dependency: String,
    },

    /// Dependencies form a cycle.
    #[error("circular dependency detected among modules: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// No module with this id was added.
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// The module is already started.
    #[error("module '{0}' is already started")]
    AlreadyStarted(String),

    /// The module is not started.
    #[error("module '{0}' is not started")]
    NotStarted(String),

    /// A dependency must be started first.
    #[error("module '{module}' cannot start before its dependency '{dependency}'")]
    DependencyNotStarted {
        /// The module being started.
        module: String,
        /// The dependency that is not running.
        dependency: String,
    },

    /// A started module still depends on the one being stopped.
    #[error("module '{module}' cannot stop while '{dependent}' depends on it")]
    DependentStillRunning {
        /// The module being stopped.
        module: String,
        /// The running module that depends on it.
        dependent: String,
    },
}
