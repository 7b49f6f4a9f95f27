//! Lifecycle demo built with Vigil.
//!
//! Each worker thread owns a [`ModuleRuntime`] with the same set of probe
//! modules and drives it through refresh, start and stop. All runtimes report
//! to one shared [`LifecycleRegistry`], so every count in the final snapshot
//! equals the number of threads.
//!
//! ```text
//! thread 0 ─┐
//! thread 1 ─┼──▶ LifecycleRegistry ──▶ snapshots (JSON)
//! thread N ─┘
//! ```

use std::num::ParseIntError;
use std::sync::{Arc, Barrier};
use std::thread;

use vigil_core_modules::{DefaultModules, ProbeModule, TracingModule};
use vigil_registry::{LifecycleRegistry, ModuleSnapshot};
use vigil_runtime::RuntimeError;
use vigil_runtime::module::{ModuleGroup, ModuleGroupBuilder};
use vigil_runtime::runtime::ModuleRuntime;

/// Errors from parsing the command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgsError {
    /// An argument was not a positive integer.
    #[error("invalid {name} '{value}': {source}")]
    NotANumber {
        /// Which argument.
        name: &'static str,
        /// The text given.
        value: String,
        /// Why it failed to parse.
        source: ParseIntError,
    },
    /// An argument was zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
    /// More arguments than expected.
    #[error("unexpected argument '{0}'")]
    Unexpected(String),
}

/// Errors from running the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// A runtime rejected its modules or a transition.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A worker thread panicked.
    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),
}

/// Demo settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    /// Probe modules per runtime.
    pub modules: usize,
    /// Runtimes, one per thread.
    pub threads: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            modules: 3,
            threads: 2,
        }
    }
}

impl DemoConfig {
    /// Parses `[module-count] [threads]`, program name excluded.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError`] for non-numeric or zero values and extra arguments.
    pub fn from_args<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config = Self::default();
        if let Some(value) = args.next() {
            config.modules = parse_positive("module-count", value)?;
        }
        if let Some(value) = args.next() {
            config.threads = parse_positive("threads", value)?;
        }
        if let Some(extra) = args.next() {
            return Err(ArgsError::Unexpected(extra));
        }
        Ok(config)
    }
}

fn parse_positive(name: &'static str, value: String) -> Result<usize, ArgsError> {
    match value.parse::<usize>() {
        Ok(0) => Err(ArgsError::Zero(name)),
        Ok(n) => Ok(n),
        Err(source) => Err(ArgsError::NotANumber {
            name,
            value,
            source,
        }),
    }
}

/// Modules for one runtime: `probe-0` depends on tracing, every other probe
/// depends on `probe-0`.
#[must_use]
pub fn demo_modules(count: usize) -> ModuleGroupBuilder {
    (0..count).fold(DefaultModules.build(), |group, i| {
        let dependency = if i == 0 {
            TracingModule::ID.to_string()
        } else {
            "probe-0".to_string()
        };
        group.add(ProbeModule::new(format!("probe-{i}")).with_dependency(dependency))
    })
}

/// Runs one runtime per thread against `registry` and returns a snapshot of
/// every module it knows, sorted by id.
///
/// # Errors
///
/// Returns the first runtime error or a [`DemoError::WorkerPanicked`].
pub fn run(
    config: DemoConfig,
    registry: &Arc<LifecycleRegistry>,
) -> Result<Vec<ModuleSnapshot>, DemoError> {
    let barrier = Arc::new(Barrier::new(config.threads));

    let handles: Vec<_> = (0..config.threads)
        .map(|worker| {
            let registry = Arc::clone(registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<usize, RuntimeError> {
                let mut runtime = ModuleRuntime::new().with_observer(registry);
                runtime.add_modules(demo_modules(config.modules))?;

                barrier.wait();
                runtime.refresh_context()?;
                let started = runtime.start()?;
                let stopped = runtime.stop();
                tracing::info!(worker, started, stopped, "worker finished");
                Ok(stopped)
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        handle
            .join()
            .map_err(|_| DemoError::WorkerPanicked(worker))??;
    }

    Ok(registry
        .module_ids()
        .iter()
        .map(|id| registry.snapshot(id.as_str()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_registry::LifecyclePhase;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_defaults_and_values() {
        assert_eq!(DemoConfig::from_args(args(&[])), Ok(DemoConfig::default()));
        assert_eq!(
            DemoConfig::from_args(args(&["5", "4"])),
            Ok(DemoConfig {
                modules: 5,
                threads: 4,
            })
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(
            DemoConfig::from_args(args(&["0"])),
            Err(ArgsError::Zero("module-count"))
        );
        assert!(matches!(
            DemoConfig::from_args(args(&["3", "many"])),
            Err(ArgsError::NotANumber { name: "threads", .. })
        ));
        assert_eq!(
            DemoConfig::from_args(args(&["1", "1", "1"])),
            Err(ArgsError::Unexpected("1".into()))
        );
    }

    #[test]
    fn demo_modules_wiring() {
        let group = demo_modules(3);
        assert_eq!(
            group.ids(),
            vec![TracingModule::ID, "probe-0", "probe-1", "probe-2"]
        );
    }

    #[test]
    fn every_thread_is_counted() {
        let registry = Arc::new(LifecycleRegistry::new());
        let config = DemoConfig {
            modules: 2,
            threads: 3,
        };

        let snapshots = run(config, &registry).unwrap();

        let ids: Vec<&str> = snapshots.iter().map(|s| s.module_id.as_str()).collect();
        assert_eq!(ids, vec!["probe-0", "probe-1", "vigil::tracing"]);
        for snapshot in &snapshots {
            for phase in LifecyclePhase::ALL {
                assert_eq!(snapshot.count(phase), 3);
            }
        }
    }
}
