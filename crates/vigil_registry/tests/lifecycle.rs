//! Query contract tests for `LifecycleRegistry`.
//!
//! These tests drive the registry the way a test harness would: reset a
//! module, report phases, then assert counts and timestamps.

use std::time::SystemTime;

use vigil_registry::{LastOccurrence, LifecyclePhase, LifecycleRegistry, ModuleId};

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn init_then_record_will_start_twice() {
    let registry = LifecycleRegistry::new();

    registry.init("moduleA");
    assert_eq!(registry.count(LifecyclePhase::WillStart, "moduleA"), 0);

    registry.record(LifecyclePhase::WillStart, "moduleA");
    registry.record(LifecyclePhase::WillStart, "moduleA");

    assert_eq!(registry.count(LifecyclePhase::WillStart, "moduleA"), 2);
    assert_eq!(registry.count(LifecyclePhase::Started, "moduleA"), 0);
    assert!(
        !registry
            .last_occurrence(LifecyclePhase::WillStart, "moduleA")
            .is_absent()
    );
    assert!(
        registry
            .last_occurrence(LifecyclePhase::WillStart, "moduleA")
            .is_recorded()
    );
}

#[test]
fn record_without_init_starts_from_zero() {
    let registry = LifecycleRegistry::new();

    registry.record(LifecyclePhase::Stopped, "moduleB");

    assert_eq!(registry.count(LifecyclePhase::Stopped, "moduleB"), 1);
    // The other phases of moduleB were never touched.
    assert_eq!(
        registry.last_occurrence(LifecyclePhase::WillStop, "moduleB"),
        LastOccurrence::Absent
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn n_sequential_records_count_n() {
    let registry = LifecycleRegistry::new();

    for phase in LifecyclePhase::ALL {
        let n = phase.index() as u64 + 3;
        for _ in 0..n {
            registry.record(phase, "counted");
        }
        assert_eq!(registry.count(phase, "counted"), n);
    }
}

#[test]
fn timestamp_is_bounded_by_call_duration() {
    let registry = LifecycleRegistry::new();

    for phase in LifecyclePhase::ALL {
        let before = SystemTime::now();
        registry.record(phase, "timed");
        let after = SystemTime::now();

        let at = registry
            .last_occurrence(phase, "timed")
            .recorded_at()
            .expect("phase was recorded");
        assert!(at >= before);
        assert!(at <= after);
    }
}

#[test]
fn init_restores_baseline_regardless_of_prior_state() {
    let registry = LifecycleRegistry::new();
    for phase in LifecyclePhase::ALL {
        registry.record(phase, "moduleA");
    }

    registry.init("moduleA");
    registry.init("moduleA");

    for phase in LifecyclePhase::ALL {
        assert_eq!(registry.count(phase, "moduleA"), 0);
        assert_eq!(
            registry.last_occurrence(phase, "moduleA"),
            LastOccurrence::Epoch
        );
        assert_eq!(
            registry.last_occurrence(phase, "moduleA").as_millis(),
            Some(0)
        );
    }
}

#[test]
fn recording_one_pair_leaves_others_untouched() {
    let registry = LifecycleRegistry::new();
    registry.init("moduleA");
    registry.init("moduleB");
    registry.record(LifecyclePhase::Started, "moduleB");
    let before_b = registry.snapshot("moduleB");

    registry.record(LifecyclePhase::WillStop, "moduleA");

    for phase in LifecyclePhase::ALL {
        if phase != LifecyclePhase::WillStop {
            assert_eq!(registry.count(phase, "moduleA"), 0);
            assert_eq!(
                registry.last_occurrence(phase, "moduleA"),
                LastOccurrence::Epoch
            );
        }
    }
    assert_eq!(registry.snapshot("moduleB"), before_b);
}

#[test]
fn identifiers_are_not_normalized() {
    let registry = LifecycleRegistry::new();

    registry.started("Module");

    assert_eq!(registry.started_count("Module"), 1);
    assert_eq!(registry.started_count("module"), 0);
    assert_eq!(registry.started_count("Module "), 0);
    assert_eq!(registry.module_ids(), vec![ModuleId::from("Module")]);
}

#[test]
fn phases_may_be_recorded_in_any_order() {
    let registry = LifecycleRegistry::new();

    registry.stopped("backwards");
    registry.started("backwards");
    registry.will_refresh_context("backwards");
    registry.stopped("backwards");

    assert_eq!(registry.stopped_count("backwards"), 2);
    assert_eq!(registry.started_count("backwards"), 1);
    assert_eq!(registry.will_refresh_context_count("backwards"), 1);
    assert_eq!(registry.will_start_count("backwards"), 0);
}

#[test]
fn per_phase_helpers_agree_with_parameterized_queries() {
    let registry = LifecycleRegistry::new();
    registry.will_refresh_context("m");
    registry.context_refreshed("m");
    registry.will_start("m");
    registry.started("m");
    registry.will_stop("m");
    registry.stopped("m");

    let counts = [
        registry.will_refresh_context_count("m"),
        registry.context_refreshed_count("m"),
        registry.will_start_count("m"),
        registry.started_count("m"),
        registry.will_stop_count("m"),
        registry.stopped_count("m"),
    ];
    let times = [
        registry.will_refresh_context_time("m"),
        registry.context_refreshed_time("m"),
        registry.will_start_time("m"),
        registry.started_time("m"),
        registry.will_stop_time("m"),
        registry.stopped_time("m"),
    ];

    for phase in LifecyclePhase::ALL {
        assert_eq!(counts[phase.index()], 1);
        assert_eq!(times[phase.index()], registry.last_occurrence(phase, "m"));
    }
}

#[test]
fn snapshot_serializes_to_json() {
    let registry = LifecycleRegistry::new();
    registry.init("moduleA");

    let json = serde_json::to_value(registry.snapshot("moduleA")).unwrap();

    assert_eq!(json["module_id"], "moduleA");
    assert_eq!(json["phases"].as_array().unwrap().len(), 6);
    assert_eq!(json["phases"][0]["phase"], "will_refresh_context");
    assert_eq!(json["phases"][0]["count"], 0);
    assert_eq!(json["phases"][0]["last_occurrence"]["state"], "epoch");
}
