//! Lifecycle demo CLI.
//!
//! Drives identical module runtimes on several threads against one shared
//! registry and prints the registry contents as JSON.
//!
//! # Usage
//!
//! ```bash
//! lifecycle-demo [module-count] [threads]
//! ```
//!
//! # Example
//!
//! ```bash
//! lifecycle-demo 4 8
//! ```

use example::{DemoConfig, run};
use std::sync::Arc;
use vigil_registry::LifecycleRegistry;

#[expect(clippy::print_stdout, reason = "the snapshot dump is the program output")]
#[expect(clippy::print_stderr, reason = "usage errors go to the terminal")]
fn main() {
    let config = DemoConfig::from_args(std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("Usage: lifecycle-demo [module-count] [threads]");
        std::process::exit(1);
    });

    let registry = Arc::new(LifecycleRegistry::new());
    let snapshots = match run(config, &registry) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&snapshots) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
