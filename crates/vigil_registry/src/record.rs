//! Event records and the values returned by registry queries.

use crate::phase::LifecyclePhase;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

// ─────────────────────────────────────────────────────────────────────────────
// ModuleId
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier of a loadable module.
///
/// Equality is exact string comparison: no case folding, no trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a module identifier from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventRecord
// ─────────────────────────────────────────────────────────────────────────────

/// Count and most recent instant for one (module, phase) pair.
///
/// Both fields are always read and written together under the registry lock,
/// so a record never pairs a new count with a stale instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    count: u64,
    last_at: Option<SystemTime>,
}

impl EventRecord {
    /// Number of times the phase has been recorded since creation or the last `init`.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Instant of the most recent recording, if any.
    #[must_use]
    pub fn last_at(&self) -> Option<SystemTime> {
        self.last_at
    }

    /// The last occurrence as seen by a query against a known pair.
    ///
    /// A known pair that has never been recorded was created by `init` and so
    /// reports [`LastOccurrence::Epoch`].
    #[must_use]
    pub fn last_occurrence(&self) -> LastOccurrence {
        match self.last_at {
            Some(at) => LastOccurrence::At(at),
            None => LastOccurrence::Epoch,
        }
    }

    pub(crate) fn observe(&mut self, at: SystemTime) {
        self.count = self.count.saturating_add(1);
        self.last_at = Some(at);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LastOccurrence
// ─────────────────────────────────────────────────────────────────────────────

/// When a phase last fired for a module.
///
/// Distinguishes a pair the registry has never heard of from one that was
/// reset with `init` and is waiting for its first recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum LastOccurrence {
    /// Never recorded nor initialized.
    Absent,
    /// Initialized, not yet recorded. Reads as the Unix epoch.
    Epoch,
    /// Recorded at the given instant.
    At(SystemTime),
}

impl LastOccurrence {
    /// Returns `true` for [`LastOccurrence::Absent`].
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` once the phase has actually been recorded.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::At(_))
    }

    /// The recorded instant, ignoring the epoch placeholder.
    #[must_use]
    pub fn recorded_at(&self) -> Option<SystemTime> {
        match self {
            Self::At(at) => Some(*at),
            Self::Absent | Self::Epoch => None,
        }
    }

    /// The instant as a `SystemTime`, with [`LastOccurrence::Epoch`] mapped to
    /// [`UNIX_EPOCH`] and [`LastOccurrence::Absent`] to `None`.
    #[must_use]
    pub fn as_system_time(&self) -> Option<SystemTime> {
        match self {
            Self::Absent => None,
            Self::Epoch => Some(UNIX_EPOCH),
            Self::At(at) => Some(*at),
        }
    }

    /// Milliseconds since the Unix epoch, `Some(0)` for [`LastOccurrence::Epoch`].
    ///
    /// Instants before the epoch clamp to zero.
    #[must_use]
    pub fn as_millis(&self) -> Option<u64> {
        self.as_system_time().map(|at| {
            at.duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// One phase of a [`ModuleSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    /// The phase.
    pub phase: LifecyclePhase,
    /// How many times it was recorded.
    pub count: u64,
    /// When it was last recorded.
    pub last_occurrence: LastOccurrence,
}

/// Every phase of one module, read under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    /// The module the snapshot describes.
    pub module_id: ModuleId,
    /// One entry per phase, in [`LifecyclePhase::ALL`] order.
    pub phases: [PhaseSnapshot; 6],
}

impl ModuleSnapshot {
    /// Count for the given phase.
    #[must_use]
    pub fn count(&self, phase: LifecyclePhase) -> u64 {
        self.phases[phase.index()].count
    }

    /// Last occurrence for the given phase.
    #[must_use]
    pub fn last_occurrence(&self, phase: LifecyclePhase) -> LastOccurrence {
        self.phases[phase.index()].last_occurrence
    }

    /// Sum of all phase counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.phases.iter().map(|p| p.count).sum()
    }

    /// Returns `true` when no phase has been recorded or initialized.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.phases.iter().all(|p| p.last_occurrence.is_absent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_record_is_empty() {
        let record = EventRecord::default();
        assert_eq!(record.count(), 0);
        assert_eq!(record.last_at(), None);
        assert_eq!(record.last_occurrence(), LastOccurrence::Epoch);
    }

    #[test]
    fn observe_increments_and_stamps() {
        let mut record = EventRecord::default();
        let at = UNIX_EPOCH + Duration::from_secs(42);

        record.observe(at);
        record.observe(at + Duration::from_secs(1));

        assert_eq!(record.count(), 2);
        assert_eq!(
            record.last_occurrence(),
            LastOccurrence::At(at + Duration::from_secs(1))
        );
    }

    #[test]
    fn last_occurrence_conversions() {
        let at = UNIX_EPOCH + Duration::from_millis(1_234);

        assert_eq!(LastOccurrence::Absent.as_millis(), None);
        assert_eq!(LastOccurrence::Epoch.as_millis(), Some(0));
        assert_eq!(LastOccurrence::At(at).as_millis(), Some(1_234));

        assert_eq!(LastOccurrence::Epoch.as_system_time(), Some(UNIX_EPOCH));
        assert_eq!(LastOccurrence::Epoch.recorded_at(), None);
        assert_eq!(LastOccurrence::At(at).recorded_at(), Some(at));
    }

    #[test]
    fn epoch_is_not_absent() {
        assert!(LastOccurrence::Absent.is_absent());
        assert!(!LastOccurrence::Epoch.is_absent());
        assert!(!LastOccurrence::Epoch.is_recorded());
    }

    #[test]
    fn module_id_compares_exactly() {
        assert_eq!(ModuleId::from("moduleA"), ModuleId::new("moduleA"));
        assert_ne!(ModuleId::from("moduleA"), ModuleId::from("modulea"));
        assert_ne!(ModuleId::from("moduleA"), ModuleId::from(" moduleA"));
    }

    #[test]
    fn last_occurrence_serializes_with_state_tag() {
        let json = serde_json::to_value(LastOccurrence::Epoch).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "epoch" }));

        let json = serde_json::to_value(LastOccurrence::Absent).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "absent" }));
    }
}
