//! Lifecycle event tracking for modular Rust services.
//!

pub use vigil_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vigil_internal::prelude::*;
}
