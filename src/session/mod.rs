//! Session seed management.

pub mod lifecycle;

pub use lifecycle::{SessionSeedLifecycle, DEFAULT_MAX_SCOPES};
