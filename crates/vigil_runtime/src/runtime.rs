//! Module runtime that fires lifecycle phases.
//!
//! The [`ModuleRuntime`] owns a set of modules, orders them by their declared
//! dependencies, and drives them through the lifecycle. It is intentionally
//! minimal: it decides *when* each phase fires and *which* module it fires
//! for, and tells its observers. Recording is the observers' job.
//!
//! # Lifecycle
//!
//! 1. **Dependency Resolution** - Validate and topologically sort modules
//! 2. **Refresh** - `will_refresh_context` on all modules, then
//!    `context_refreshed` on all modules
//! 3. **Start** - `will_start` then `started`, module by module, in order
//! 4. **Stop** - `will_stop` then `stopped`, module by module, in reverse order
//!
//! Modules added after resolution are resolved on the next lifecycle call and
//! ordered after the modules already resolved.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vigil_registry::LifecycleRegistry;
//! use vigil_runtime::module::Module;
//! use vigil_runtime::runtime::ModuleRuntime;
//!
//! struct Audit;
//!
//! impl Module for Audit {
//!     fn id(&self) -> &str {
//!         "audit"
//!     }
//! }
//!
//! let registry = Arc::new(LifecycleRegistry::new());
//! let mut runtime = ModuleRuntime::new().with_observer(registry.clone());
//! runtime.add_modules(Audit)?;
//!
//! runtime.refresh_context()?;
//! runtime.start()?;
//! runtime.stop();
//!
//! assert_eq!(registry.will_refresh_context_count("audit"), 1);
//! assert_eq!(registry.started_count("audit"), 1);
//! assert_eq!(registry.stopped_count("audit"), 1);
//! # Ok::<(), vigil_runtime::RuntimeError>(())
//! ```

use crate::error::RuntimeError;
use crate::module::{Module, ModuleContext, Modules};
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;
use std::sync::Arc;
use vigil_registry::{LifecycleObserver, LifecyclePhase};

// ─────────────────────────────────────────────────────────────────────────────
// ModuleState
// ─────────────────────────────────────────────────────────────────────────────

/// Where a module is in its start/stop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    /// Added, never started.
    #[default]
    Loaded,
    /// `started` has fired and `will_stop` has not.
    Started,
    /// `stopped` has fired. The module may be started again.
    Stopped,
}

impl ModuleState {
    /// Returns `true` for [`ModuleState::Started`].
    #[must_use]
    pub fn is_started(self) -> bool {
        self == Self::Started
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModuleRuntime
// ─────────────────────────────────────────────────────────────────────────────

/// Internal entry for a registered module.
struct ModuleEntry {
    /// The module instance.
    module: Box<dyn Module>,

    /// The module id (cached).
    id: String,

    /// Declared dependencies (cached at add time).
    dependencies: Vec<String>,

    state: ModuleState,
}

/// The runtime that orders modules and fires their lifecycle phases.
pub struct ModuleRuntime {
    /// Modules added since the last resolution, in insertion order.
    pending: Vec<ModuleEntry>,

    /// Modules in dependency order.
    resolved: Vec<ModuleEntry>,

    /// Every id added so far (for duplicate detection).
    module_ids: HashSet<String>,

    /// Notified after every fired phase, in registration order.
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl Default for ModuleRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRuntime {
    /// Creates a runtime with no modules and no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            resolved: Vec::new(),
            module_ids: HashSet::new(),
            observers: Vec::new(),
        }
    }

    /// Adds an observer and returns the runtime, for builder-style setup.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Adds an observer.
    pub fn add_observer(&mut self, observer: Arc<dyn LifecycleObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Module Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds one or more modules to the runtime.
    ///
    /// Accepts either:
    /// - A single module implementing [`Module`]
    /// - A [`ModuleGroupBuilder`](crate::module::ModuleGroupBuilder) containing multiple modules
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateModule`] if an id is already taken,
    /// either by an earlier module or twice within the same group.
    pub fn add_modules<M: Modules>(&mut self, modules: M) -> Result<&mut Self, RuntimeError> {
        modules.add_to_runtime(self)?;
        Ok(self)
    }

    /// Adds boxed modules, all or nothing.
    pub(crate) fn add_boxed(&mut self, modules: Vec<Box<dyn Module>>) -> Result<(), RuntimeError> {
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for module in &modules {
                let id = module.id();
                if self.module_ids.contains(id) || !seen.insert(id) {
                    return Err(RuntimeError::DuplicateModule(id.to_string()));
                }
            }
        }

        for module in modules {
            let id = module.id().to_string();
            let dependencies = module.dependencies();
            tracing::debug!(module_id = %id, ?dependencies, "module added");
            self.module_ids.insert(id.clone());
            self.pending.push(ModuleEntry {
                module,
                id,
                dependencies,
                state: ModuleState::Loaded,
            });
        }
        Ok(())
    }

    /// Returns true if a module with this id has been added.
    #[must_use]
    pub fn has_module(&self, id: &str) -> bool {
        self.module_ids.contains(id)
    }

    /// Module ids: resolved modules in dependency order, then modules not yet
    /// resolved in insertion order.
    #[must_use]
    pub fn module_ids(&self) -> Vec<&str> {
        self.resolved
            .iter()
            .chain(self.pending.iter())
            .map(|entry| entry.id.as_str())
            .collect()
    }

    /// The state of the module with this id.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<ModuleState> {
        self.resolved
            .iter()
            .chain(self.pending.iter())
            .find(|entry| entry.id == id)
            .map(|entry| entry.state)
    }

    /// Number of modules added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.module_ids.len()
    }

    /// Returns true if no module has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.module_ids.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Fires `will_refresh_context` on every module, then `context_refreshed`
    /// on every module, in dependency order.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if a dependency is missing or circular.
    pub fn refresh_context(&mut self) -> Result<(), RuntimeError> {
        self.resolve()?;

        for phase in [
            LifecyclePhase::WillRefreshContext,
            LifecyclePhase::ContextRefreshed,
        ] {
            for entry in &self.resolved {
                Self::fire(&self.observers, entry, phase);
            }
        }

        tracing::info!(modules = self.resolved.len(), "context refreshed");
        Ok(())
    }

    /// Starts every module that is not already started, in dependency order.
    ///
    /// Returns how many modules were started.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if a dependency is missing or circular.
    pub fn start(&mut self) -> Result<usize, RuntimeError> {
        self.resolve()?;

        let mut started = 0;
        for entry in &mut self.resolved {
            if entry.state.is_started() {
                continue;
            }
            Self::fire(&self.observers, entry, LifecyclePhase::WillStart);
            Self::fire(&self.observers, entry, LifecyclePhase::Started);
            entry.state = ModuleState::Started;
            started += 1;
        }

        tracing::info!(started, "modules started");
        Ok(started)
    }

    /// Starts a single module.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::UnknownModule`] if no module has this id
    /// - [`RuntimeError::AlreadyStarted`] if it is running
    /// - [`RuntimeError::DependencyNotStarted`] if a dependency is not running
    /// - a resolution error if a dependency is missing or circular
    pub fn start_module(&mut self, id: &str) -> Result<(), RuntimeError> {
        self.resolve()?;
        let idx = self.resolved_index(id)?;

        let entry = &self.resolved[idx];
        if entry.state.is_started() {
            return Err(RuntimeError::AlreadyStarted(id.to_string()));
        }
        if let Some(dependency) = entry.dependencies.iter().find(|dep| {
            !self
                .resolved
                .iter()
                .any(|other| other.id == **dep && other.state.is_started())
        }) {
            return Err(RuntimeError::DependencyNotStarted {
                module: id.to_string(),
                dependency: dependency.clone(),
            });
        }

        let entry = &mut self.resolved[idx];
        Self::fire(&self.observers, entry, LifecyclePhase::WillStart);
        Self::fire(&self.observers, entry, LifecyclePhase::Started);
        entry.state = ModuleState::Started;
        Ok(())
    }

    /// Stops every started module, in reverse dependency order.
    ///
    /// Returns how many modules were stopped.
    pub fn stop(&mut self) -> usize {
        let mut stopped = 0;
        for entry in self.resolved.iter_mut().rev() {
            if !entry.state.is_started() {
                continue;
            }
            Self::fire(&self.observers, entry, LifecyclePhase::WillStop);
            Self::fire(&self.observers, entry, LifecyclePhase::Stopped);
            entry.state = ModuleState::Stopped;
            stopped += 1;
        }

        tracing::info!(stopped, "modules stopped");
        stopped
    }

    /// Stops a single module.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::UnknownModule`] if no module has this id
    /// - [`RuntimeError::NotStarted`] if it is not running
    /// - [`RuntimeError::DependentStillRunning`] if a running module depends on it
    pub fn stop_module(&mut self, id: &str) -> Result<(), RuntimeError> {
        let idx = match self.resolved_index(id) {
            Ok(idx) => idx,
            // Unresolved modules have never been started.
            Err(_) if self.has_module(id) => {
                return Err(RuntimeError::NotStarted(id.to_string()));
            }
            Err(err) => return Err(err),
        };

        if !self.resolved[idx].state.is_started() {
            return Err(RuntimeError::NotStarted(id.to_string()));
        }
        if let Some(dependent) = self
            .resolved
            .iter()
            .find(|other| other.state.is_started() && other.dependencies.iter().any(|d| d == id))
        {
            return Err(RuntimeError::DependentStillRunning {
                module: id.to_string(),
                dependent: dependent.id.clone(),
            });
        }

        let entry = &mut self.resolved[idx];
        Self::fire(&self.observers, entry, LifecyclePhase::WillStop);
        Self::fire(&self.observers, entry, LifecyclePhase::Stopped);
        entry.state = ModuleState::Stopped;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Calls the module hook for `phase`, then notifies observers.
    fn fire(observers: &[Arc<dyn LifecycleObserver>], entry: &ModuleEntry, phase: LifecyclePhase) {
        let ctx = ModuleContext::new(&entry.id, phase, &entry.dependencies);
        let module = &entry.module;
        match phase {
            LifecyclePhase::WillRefreshContext => module.will_refresh_context(&ctx),
            LifecyclePhase::ContextRefreshed => module.context_refreshed(&ctx),
            LifecyclePhase::WillStart => module.will_start(&ctx),
            LifecyclePhase::Started => module.started(&ctx),
            LifecyclePhase::WillStop => module.will_stop(&ctx),
            LifecyclePhase::Stopped => module.stopped(&ctx),
        }

        for observer in observers {
            observer.on_phase(phase, &entry.id);
        }
        tracing::debug!(module_id = %entry.id, %phase, "lifecycle phase fired");
    }

    fn resolved_index(&self, id: &str) -> Result<usize, RuntimeError> {
        self.resolved
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| RuntimeError::UnknownModule(id.to_string()))
    }

    /// Moves pending modules into `resolved` in dependency order.
    ///
    /// Uses Kahn's algorithm. Modules whose dependencies are equally satisfied
    /// keep their insertion order. On error nothing is moved.
    fn resolve(&mut self) -> Result<(), RuntimeError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        // `index_of` borrows `self.pending`; release it before moving entries.
        let sorted = {
            let n = self.pending.len();
            let index_of: HashMap<&str, usize> = self
                .pending
                .iter()
                .enumerate()
                .map(|(i, entry)| (entry.id.as_str(), i))
                .collect();

            let mut in_degree = vec![0usize; n];
            let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

            for (i, entry) in self.pending.iter().enumerate() {
                for dep in &entry.dependencies {
                    if let Some(&dep_idx) = index_of.get(dep.as_str()) {
                        // dep_idx must come before i
                        dependents[dep_idx].push(i);
                        in_degree[i] += 1;
                    } else if !self.resolved.iter().any(|r| r.id == *dep) {
                        return Err(RuntimeError::MissingDependency {
                            module: entry.id.clone(),
                            dependency: dep.clone(),
                        });
                    }
                }
            }

            let mut queue: VecDeque<usize> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, deg)| **deg == 0)
                .map(|(i, _)| i)
                .collect();
            let mut sorted: Vec<usize> = Vec::with_capacity(n);

            while let Some(idx) = queue.pop_front() {
                sorted.push(idx);
                for &dependent in &dependents[idx] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        queue.push_back(dependent);
                    }
                }
            }

            if sorted.len() != n {
                let in_cycle: Vec<String> = in_degree
                    .iter()
                    .enumerate()
                    .filter(|(_, deg)| **deg > 0)
                    .map(|(i, _)| self.pending[i].id.clone())
                    .collect();
                return Err(RuntimeError::CircularDependency(in_cycle));
            }

            sorted
        };

        let mut slots: Vec<Option<ModuleEntry>> = core::mem::take(&mut self.pending)
            .into_iter()
            .map(Some)
            .collect();
        for idx in sorted {
            if let Some(entry) = slots[idx].take() {
                self.resolved.push(entry);
            }
        }

        tracing::debug!(order = ?self.module_ids(), "module order resolved");
        Ok(())
    }
}
