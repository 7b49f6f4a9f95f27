//! Tracing and observability module.
//!
//! Provides [`TracingModule`] which configures the `tracing` subscriber.
//!
//! # Lifecycle
//!
//! - **`will_refresh_context`** installs the subscriber, so every module that
//!   depends on `vigil::tracing` logs through it from its own refresh onward.
//! - **`started`** and **`stopped`** log at `info`.
//!
//! Installation is attempted once per module instance and silently skipped
//! when another global subscriber is already set.
//!
//! # Example
//!
//! ```
//! use vigil_core_modules::{TracingFormat, TracingModule};
//! use vigil_runtime::runtime::ModuleRuntime;
//! use tracing::Level;
//!
//! let mut runtime = ModuleRuntime::new();
//! runtime.add_modules(
//!     TracingModule::default()
//!         .with_level(Level::DEBUG)
//!         .with_format(TracingFormat::Compact),
//! )?;
//! runtime.refresh_context()?;
//! # Ok::<(), vigil_runtime::RuntimeError>(())
//! ```

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vigil_runtime::module::{Module, ModuleContext};

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The level and format a [`TracingModule`] installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingModule
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing and logging module.
///
/// Configures the `tracing` subscriber using [`tracing_subscriber`].
///
/// # Configuration Options
///
/// ```
/// use vigil_core_modules::{TracingFormat, TracingModule};
/// use tracing::Level;
///
/// // Development: pretty output with span enter/exit
/// let dev = TracingModule::default()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // Production: JSON output, quiet registry
/// let prod = TracingModule::default()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("vigil_runtime=info,vigil_registry=warn");
/// ```
pub struct TracingModule {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "`vigil_runtime=debug,vigil_registry=warn`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
    installed: Once,
}

impl Default for TracingModule {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
            installed: Once::new(),
        }
    }
}

impl TracingModule {
    /// The module id.
    pub const ID: &'static str = "vigil::tracing";

    /// Creates a new `TracingModule` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`. An unparsable filter falls
    /// back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The level and format this module installs.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    fn install(&self) {
        let env_filter = self.env_filter();
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init() fails when a global subscriber already exists; keep it.
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events);
        match self.format {
            TracingFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer.pretty())
                    .try_init()
                    .ok();
            }
            TracingFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer.compact())
                    .try_init()
                    .ok();
            }
            TracingFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer.json())
                    .try_init()
                    .ok();
            }
        }

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            "tracing subscriber installed"
        );
    }
}

impl Module for TracingModule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn will_refresh_context(&self, _ctx: &ModuleContext<'_>) {
        self.installed.call_once(|| self.install());
    }

    fn started(&self, _ctx: &ModuleContext<'_>) {
        tracing::info!(level = %self.level, "tracing module started");
    }

    fn stopped(&self, _ctx: &ModuleContext<'_>) {
        tracing::info!("tracing module shutting down");
    }
}
