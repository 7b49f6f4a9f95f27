//! The lifecycle event registry.
//!
//! [`LifecycleRegistry`] records how many times each [`LifecyclePhase`] fired
//! for each module and when it last fired. It is a passive recorder: it never
//! rejects a phase, never checks ordering and never relates one phase to
//! another.
//!
//! # Concurrency
//!
//! All state lives in one map from `(phase, module)` to an [`EventRecord`]
//! behind a single `RwLock`. Recording takes the write lock for the whole
//! count-and-timestamp update; queries take the read lock. A reader can
//! therefore never observe a count without its matching timestamp.
//!
//! # Example
//!
//! ```
//! use vigil_registry::{LastOccurrence, LifecyclePhase, LifecycleRegistry};
//!
//! let registry = LifecycleRegistry::new();
//! registry.init("moduleA");
//! assert_eq!(registry.count(LifecyclePhase::WillStart, "moduleA"), 0);
//! assert_eq!(
//!     registry.last_occurrence(LifecyclePhase::WillStart, "moduleA"),
//!     LastOccurrence::Epoch
//! );
//!
//! registry.will_start("moduleA");
//! registry.will_start("moduleA");
//! assert_eq!(registry.will_start_count("moduleA"), 2);
//! assert_eq!(registry.started_count("moduleA"), 0);
//! assert!(registry.will_start_time("moduleA").is_recorded());
//! ```

use crate::clock::{SystemWallClock, WallClock};
use crate::phase::LifecyclePhase;
use crate::record::{EventRecord, LastOccurrence, ModuleId, ModuleSnapshot, PhaseSnapshot};
use hashbrown::{Equivalent, HashMap};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

// ─────────────────────────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Owned composite key stored in the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EventKey {
    phase: LifecyclePhase,
    module_id: ModuleId,
}

/// Borrowed lookup key.
///
/// Field order and types hash identically to [`EventKey`], so queries look up
/// a `&str` without allocating a [`ModuleId`].
#[derive(Hash)]
struct EventKeyRef<'a> {
    phase: LifecyclePhase,
    module_id: &'a str,
}

impl<'a> EventKeyRef<'a> {
    fn new(phase: LifecyclePhase, module_id: &'a str) -> Self {
        Self { phase, module_id }
    }
}

impl Equivalent<EventKey> for EventKeyRef<'_> {
    fn equivalent(&self, key: &EventKey) -> bool {
        self.phase == key.phase && self.module_id == key.module_id.as_str()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LifecycleObserver
// ─────────────────────────────────────────────────────────────────────────────

/// Receives a notification each time a module runtime fires a lifecycle phase.
///
/// [`LifecycleRegistry`] implements this by recording the phase.
pub trait LifecycleObserver: Send + Sync + 'static {
    /// Called after `phase` fired for `module_id`.
    fn on_phase(&self, phase: LifecyclePhase, module_id: &str);
}

impl LifecycleObserver for LifecycleRegistry {
    fn on_phase(&self, phase: LifecyclePhase, module_id: &str) {
        self.record(phase, module_id);
    }
}

impl LifecycleObserver for &'static LifecycleRegistry {
    fn on_phase(&self, phase: LifecyclePhase, module_id: &str) {
        self.record(phase, module_id);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LifecycleRegistry
// ─────────────────────────────────────────────────────────────────────────────

static GLOBAL_REGISTRY: OnceLock<LifecycleRegistry> = OnceLock::new();

/// Thread-safe record of lifecycle phase counts and timestamps per module.
///
/// Either use the process-wide instance from [`LifecycleRegistry::global`], or
/// build one with [`LifecycleRegistry::new`] and share it through an `Arc`.
pub struct LifecycleRegistry {
    events: RwLock<HashMap<EventKey, EventRecord>>,
    clock: Arc<dyn WallClock>,
}

impl Default for LifecycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("entries", &self.events.read().len())
            .finish_non_exhaustive()
    }
}

impl LifecycleRegistry {
    /// Creates an empty registry stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemWallClock))
    }

    /// Creates an empty registry that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn WallClock>) -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the process-wide registry, creating it on first access.
    ///
    /// Every call returns the same instance, including under concurrent first
    /// access from several threads.
    pub fn global() -> &'static LifecycleRegistry {
        GLOBAL_REGISTRY.get_or_init(LifecycleRegistry::new)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────────

    /// Resets every phase of `module_id` to a zero count and an
    /// [`LastOccurrence::Epoch`] timestamp.
    ///
    /// Accepts identifiers the registry has never seen. Any previous counts
    /// and timestamps are discarded.
    pub fn init(&self, module_id: &str) {
        {
            let mut events = self.events.write();
            for phase in LifecyclePhase::ALL {
                match events.get_mut(&EventKeyRef::new(phase, module_id)) {
                    Some(record) => *record = EventRecord::default(),
                    None => {
                        events.insert(
                            EventKey {
                                phase,
                                module_id: ModuleId::from(module_id),
                            },
                            EventRecord::default(),
                        );
                    }
                }
            }
        }
        tracing::debug!(module_id, "lifecycle events reset");
    }

    /// Records that `phase` fired for `module_id` now.
    ///
    /// The timestamp is captured and the count incremented inside one
    /// critical section. Returns the updated record.
    pub fn record(&self, phase: LifecyclePhase, module_id: &str) -> EventRecord {
        let record = {
            let mut events = self.events.write();
            let now = self.clock.now();
            if let Some(record) = events.get_mut(&EventKeyRef::new(phase, module_id)) {
                record.observe(now);
                *record
            } else {
                let mut record = EventRecord::default();
                record.observe(now);
                events.insert(
                    EventKey {
                        phase,
                        module_id: ModuleId::from(module_id),
                    },
                    record,
                );
                record
            }
        };
        tracing::trace!(
            %phase,
            module_id,
            count = record.count(),
            "lifecycle phase recorded"
        );
        record
    }

    /// Records [`LifecyclePhase::WillRefreshContext`].
    pub fn will_refresh_context(&self, module_id: &str) {
        self.record(LifecyclePhase::WillRefreshContext, module_id);
    }

    /// Records [`LifecyclePhase::ContextRefreshed`].
    pub fn context_refreshed(&self, module_id: &str) {
        self.record(LifecyclePhase::ContextRefreshed, module_id);
    }

    /// Records [`LifecyclePhase::WillStart`].
    pub fn will_start(&self, module_id: &str) {
        self.record(LifecyclePhase::WillStart, module_id);
    }

    /// Records [`LifecyclePhase::Started`].
    pub fn started(&self, module_id: &str) {
        self.record(LifecyclePhase::Started, module_id);
    }

    /// Records [`LifecyclePhase::WillStop`].
    pub fn will_stop(&self, module_id: &str) {
        self.record(LifecyclePhase::WillStop, module_id);
    }

    /// Records [`LifecyclePhase::Stopped`].
    pub fn stopped(&self, module_id: &str) {
        self.record(LifecyclePhase::Stopped, module_id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The (count, instant) pair for `phase` and `module_id`, or `None` if the
    /// pair was never recorded nor initialized.
    #[must_use]
    pub fn event(&self, phase: LifecyclePhase, module_id: &str) -> Option<EventRecord> {
        self.events
            .read()
            .get(&EventKeyRef::new(phase, module_id))
            .copied()
    }

    /// Number of times `phase` was recorded for `module_id`; zero when unknown.
    #[must_use]
    pub fn count(&self, phase: LifecyclePhase, module_id: &str) -> u64 {
        self.event(phase, module_id)
            .map_or(0, |record| record.count())
    }

    /// When `phase` was last recorded for `module_id`.
    ///
    /// Returns [`LastOccurrence::Absent`] for an unknown pair and
    /// [`LastOccurrence::Epoch`] for a pair reset by [`init`](Self::init) and
    /// not recorded since.
    #[must_use]
    pub fn last_occurrence(&self, phase: LifecyclePhase, module_id: &str) -> LastOccurrence {
        self.event(phase, module_id)
            .map_or(LastOccurrence::Absent, |record| record.last_occurrence())
    }

    /// Every phase of `module_id`, read under one lock.
    #[must_use]
    pub fn snapshot(&self, module_id: &str) -> ModuleSnapshot {
        let events = self.events.read();
        let phases = LifecyclePhase::ALL.map(|phase| {
            let record = events.get(&EventKeyRef::new(phase, module_id));
            PhaseSnapshot {
                phase,
                count: record.map_or(0, EventRecord::count),
                last_occurrence: record
                    .map_or(LastOccurrence::Absent, EventRecord::last_occurrence),
            }
        });
        ModuleSnapshot {
            module_id: ModuleId::from(module_id),
            phases,
        }
    }

    /// Returns `true` if any phase of `module_id` was recorded or initialized.
    #[must_use]
    pub fn is_known(&self, module_id: &str) -> bool {
        let events = self.events.read();
        LifecyclePhase::ALL
            .into_iter()
            .any(|phase| events.contains_key(&EventKeyRef::new(phase, module_id)))
    }

    /// Every module identifier the registry knows about, sorted.
    #[must_use]
    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self
            .events
            .read()
            .keys()
            .map(|key| key.module_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Count of [`LifecyclePhase::WillRefreshContext`].
    #[must_use]
    pub fn will_refresh_context_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::WillRefreshContext, module_id)
    }

    /// Count of [`LifecyclePhase::ContextRefreshed`].
    #[must_use]
    pub fn context_refreshed_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::ContextRefreshed, module_id)
    }

    /// Count of [`LifecyclePhase::WillStart`].
    #[must_use]
    pub fn will_start_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::WillStart, module_id)
    }

    /// Count of [`LifecyclePhase::Started`].
    #[must_use]
    pub fn started_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::Started, module_id)
    }

    /// Count of [`LifecyclePhase::WillStop`].
    #[must_use]
    pub fn will_stop_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::WillStop, module_id)
    }

    /// Count of [`LifecyclePhase::Stopped`].
    #[must_use]
    pub fn stopped_count(&self, module_id: &str) -> u64 {
        self.count(LifecyclePhase::Stopped, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::WillRefreshContext`].
    #[must_use]
    pub fn will_refresh_context_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::WillRefreshContext, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::ContextRefreshed`].
    #[must_use]
    pub fn context_refreshed_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::ContextRefreshed, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::WillStart`].
    #[must_use]
    pub fn will_start_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::WillStart, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::Started`].
    #[must_use]
    pub fn started_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::Started, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::WillStop`].
    #[must_use]
    pub fn will_stop_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::WillStop, module_id)
    }

    /// Last occurrence of [`LifecyclePhase::Stopped`].
    #[must_use]
    pub fn stopped_time(&self, module_id: &str) -> LastOccurrence {
        self.last_occurrence(LifecyclePhase::Stopped, module_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockWallClock;
    use std::time::{Duration, UNIX_EPOCH};

    fn mock_registry() -> (Arc<MockWallClock>, LifecycleRegistry) {
        let clock = Arc::new(MockWallClock::new(UNIX_EPOCH + Duration::from_secs(1_000)));
        let registry = LifecycleRegistry::with_clock(clock.clone());
        (clock, registry)
    }

    #[test]
    fn unknown_module_reads_as_zero_and_absent() {
        let registry = LifecycleRegistry::new();

        for phase in LifecyclePhase::ALL {
            assert_eq!(registry.count(phase, "ghost"), 0);
            assert_eq!(registry.last_occurrence(phase, "ghost"), LastOccurrence::Absent);
            assert_eq!(registry.event(phase, "ghost"), None);
        }
        assert!(!registry.is_known("ghost"));
    }

    #[test]
    fn init_sets_every_phase_to_epoch() {
        let registry = LifecycleRegistry::new();
        registry.init("moduleA");

        for phase in LifecyclePhase::ALL {
            assert_eq!(registry.count(phase, "moduleA"), 0);
            assert_eq!(registry.last_occurrence(phase, "moduleA"), LastOccurrence::Epoch);
            assert_eq!(registry.event(phase, "moduleA"), Some(EventRecord::default()));
        }
        assert!(registry.is_known("moduleA"));
    }

    #[test]
    fn init_discards_previous_recordings() {
        let registry = LifecycleRegistry::new();
        registry.started("moduleA");
        registry.started("moduleA");
        registry.stopped("moduleA");

        registry.init("moduleA");

        assert_eq!(registry.started_count("moduleA"), 0);
        assert_eq!(registry.stopped_time("moduleA"), LastOccurrence::Epoch);
    }

    #[test]
    fn record_stamps_with_clock_time() {
        let (clock, registry) = mock_registry();

        registry.will_start("moduleA");
        let first = registry.will_start_time("moduleA");
        assert_eq!(first, LastOccurrence::At(clock.current()));

        clock.advance(Duration::from_secs(5));
        registry.will_start("moduleA");

        assert_eq!(registry.will_start_time("moduleA"), LastOccurrence::At(clock.current()));
        assert_eq!(
            registry.will_start_time("moduleA").as_millis(),
            Some(1_005_000)
        );
    }

    #[test]
    fn record_returns_updated_record() {
        let (clock, registry) = mock_registry();

        let record = registry.record(LifecyclePhase::Stopped, "moduleB");

        assert_eq!(record.count(), 1);
        assert_eq!(record.last_at(), Some(clock.current()));
    }

    #[test]
    fn phases_are_independent() {
        let registry = LifecycleRegistry::new();
        registry.init("moduleA");

        registry.will_start("moduleA");

        assert_eq!(registry.will_start_count("moduleA"), 1);
        for phase in LifecyclePhase::ALL {
            if phase != LifecyclePhase::WillStart {
                assert_eq!(registry.count(phase, "moduleA"), 0);
                assert_eq!(registry.last_occurrence(phase, "moduleA"), LastOccurrence::Epoch);
            }
        }
    }

    #[test]
    fn modules_are_independent() {
        let registry = LifecycleRegistry::new();

        registry.started("moduleA");

        assert_eq!(registry.started_count("moduleA"), 1);
        assert_eq!(registry.started_count("moduleB"), 0);
        assert_eq!(registry.started_count("modulea"), 0);
        assert!(registry.started_time("moduleB").is_absent());
    }

    #[test]
    fn snapshot_matches_individual_queries() {
        let (_clock, registry) = mock_registry();
        registry.init("moduleA");
        registry.will_refresh_context("moduleA");
        registry.context_refreshed("moduleA");
        registry.context_refreshed("moduleA");

        let snapshot = registry.snapshot("moduleA");

        assert_eq!(snapshot.module_id.as_str(), "moduleA");
        for phase in LifecyclePhase::ALL {
            assert_eq!(snapshot.count(phase), registry.count(phase, "moduleA"));
            assert_eq!(
                snapshot.last_occurrence(phase),
                registry.last_occurrence(phase, "moduleA")
            );
        }
        assert_eq!(snapshot.total(), 3);
        assert!(!snapshot.is_unknown());
        assert!(registry.snapshot("ghost").is_unknown());
    }

    #[test]
    fn module_ids_are_sorted_and_unique() {
        let registry = LifecycleRegistry::new();
        registry.started("zeta");
        registry.init("alpha");
        registry.stopped("zeta");

        let ids = registry.module_ids();

        assert_eq!(ids, vec![ModuleId::from("alpha"), ModuleId::from("zeta")]);
    }

    #[test]
    fn observer_records_phases() {
        let registry = Arc::new(LifecycleRegistry::new());
        let observer: Arc<dyn LifecycleObserver> = registry.clone();

        observer.on_phase(LifecyclePhase::WillStop, "moduleA");

        assert_eq!(registry.will_stop_count("moduleA"), 1);
    }

    #[test]
    fn global_returns_same_instance() {
        assert!(core::ptr::eq(
            LifecycleRegistry::global(),
            LifecycleRegistry::global()
        ));
    }
}
