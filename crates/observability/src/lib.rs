//! Process-wide logging setup shared by the intake binaries and tests.

/// Subscriber construction (filters, JSON formatting).
pub mod subscriber;

pub use subscriber::{DEFAULT_FILTER, init, init_with_default};
