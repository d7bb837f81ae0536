//! Engine error types.
//!
//! Every public operation of the engine returns a usable value; these errors
//! exist for the fallible variants and for diagnostics.

use thiserror::Error;

/// Result alias used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the deterministic generation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A caller violated a precondition (empty list, `min > max`, bad weights, empty seed).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The archetype catalog could not be loaded or parsed.
    ///
    /// Recovered internally by the single-archetype fallback.
    #[error("Archetype catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("Malformed pixel buffer: {width}x{height} needs {expected} bytes, got {len}")]
    MalformedBuffer {
        width: u32,
        height: u32,
        expected: usize,
        len: usize,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
