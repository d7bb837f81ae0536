//! Deterministic randomness.
//!
//! Everything random in the engine is a pure function of a [`Seed`] and a
//! permanent draw index. There is no generator state to advance, so the order
//! in which attributes are computed can never leak into their values.

pub mod field;
pub mod hash;
pub mod indices;
pub mod seed;

pub use field::SeededRandomField;
pub use hash::{fnv1a_32, Fnv1a};
pub use seed::Seed;
