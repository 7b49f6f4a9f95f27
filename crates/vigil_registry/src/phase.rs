//! The six lifecycle phases a loadable module passes through.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named point in a module's refresh/start/stop sequence.
///
/// The registry attaches no ordering semantics to phases: any phase may be
/// recorded for any module at any time, any number of times. The order of
/// [`LifecyclePhase::ALL`] is the order a well-behaved runtime fires them in,
/// and is used only for iteration and display.
///
/// # Example
///
/// ```
/// use vigil_registry::LifecyclePhase;
///
/// let phase: LifecyclePhase = "will_start".parse().unwrap();
/// assert_eq!(phase, LifecyclePhase::WillStart);
/// assert_eq!(phase.to_string(), "will_start");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Fired before the runtime refreshes its shared context.
    WillRefreshContext,
    /// Fired after the shared context has been refreshed.
    ContextRefreshed,
    /// Fired before a module is started.
    WillStart,
    /// Fired once a module has started.
    Started,
    /// Fired before a module is stopped.
    WillStop,
    /// Fired once a module has stopped.
    Stopped,
}

impl LifecyclePhase {
    /// Every phase, in lifecycle order.
    pub const ALL: [LifecyclePhase; 6] = [
        LifecyclePhase::WillRefreshContext,
        LifecyclePhase::ContextRefreshed,
        LifecyclePhase::WillStart,
        LifecyclePhase::Started,
        LifecyclePhase::WillStop,
        LifecyclePhase::Stopped,
    ];

    /// Returns the snake_case name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WillRefreshContext => "will_refresh_context",
            Self::ContextRefreshed => "context_refreshed",
            Self::WillStart => "will_start",
            Self::Started => "started",
            Self::WillStop => "will_stop",
            Self::Stopped => "stopped",
        }
    }

    /// Position of the phase within [`LifecyclePhase::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised phase name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePhaseError {
    /// The name does not match any lifecycle phase.
    #[error("unknown lifecycle phase '{0}'")]
    UnknownPhase(String),
}

impl FromStr for LifecyclePhase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ParsePhaseError::UnknownPhase(s.to_string()))
    }
}
