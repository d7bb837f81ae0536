//! Index-addressable pseudo-random field.
//!
//! A [`SeededRandomField`] maps `(seed, index)` to a value in `[0, 1)` with no
//! internal cursor. Any draw can be taken at any time, in any order, by any
//! call site, and always yields the same value. All derived helpers are built
//! on [`SeededRandomField::draw`].
//!
//! # Example
//!
//! ```rust
//! use ki_fingerprint_engine::random::{Seed, SeededRandomField};
//!
//! let seed = Seed::new("a1b2c3d4").unwrap();
//! let field = SeededRandomField::new(&seed);
//!
//! let first = field.draw(5);
//! let _ = field.draw(1);
//! assert_eq!(first, field.draw(5));
//! ```

use std::f64::consts::PI;

use crate::error::{EngineError, EngineResult};
use crate::random::hash::Fnv1a;
use crate::random::seed::Seed;

/// Lower clamp for the first Box-Muller draw, keeps `ln` finite.
const GAUSSIAN_EPSILON: f64 = 1e-12;

/// Deterministic random field keyed by a seed.
#[derive(Debug, Clone, Copy)]
pub struct SeededRandomField<'a> {
    seed: &'a Seed,
    /// Hash state after the canonical `"{seed}:"` prefix.
    prefix: Fnv1a,
}

impl<'a> SeededRandomField<'a> {
    /// Create the field for `seed`.
    pub fn new(seed: &'a Seed) -> Self {
        let prefix = Fnv1a::new().update(seed.as_bytes()).update(b":");
        Self { seed, prefix }
    }

    /// The seed this field is keyed by.
    pub fn seed(&self) -> &'a Seed {
        self.seed
    }

    /// Value in `[0, 1)` for `index`: FNV-1a over `"{seed}:{index}"`, divided by 2^32.
    #[inline]
    pub fn draw(&self, index: u64) -> f64 {
        self.prefix.update_decimal(index).unit()
    }

    /// Normally distributed value via Box-Muller over draws `2*index` and `2*index + 1`.
    ///
    /// `std_dev` is used by magnitude.
    pub fn gaussian(&self, index: u64, mean: f64, std_dev: f64) -> f64 {
        let base = index.wrapping_mul(2);
        let u1 = self.draw(base).max(GAUSSIAN_EPSILON);
        let u2 = self.draw(base.wrapping_add(1));
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + z * std_dev.abs()
    }

    /// Position chosen by a single draw scaled over the cumulative `weights`.
    ///
    /// Weights are consumed in list order; the first one that drives the
    /// remainder to zero or below wins. Zero-weight entries are never chosen,
    /// and the last positive entry absorbs floating-point leftovers.
    pub fn weighted_index(&self, index: u64, weights: &[f64]) -> EngineResult<usize> {
        if weights.is_empty() {
            return Err(EngineError::invalid("weighted choice over an empty list"));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(EngineError::invalid(format!(
                "weights must be finite and non-negative, got {}",
                bad
            )));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(EngineError::invalid("weights must sum to a positive total"));
        }

        let mut remainder = self.draw(index) * total;
        let mut last_positive = 0;
        for (position, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            last_positive = position;
            remainder -= weight;
            if remainder <= 0.0 {
                return Ok(position);
            }
        }
        Ok(last_positive)
    }

    /// Pick one of `items`, weighted by the parallel `weights` slice.
    pub fn weighted_choice<'t, T>(
        &self,
        index: u64,
        items: &'t [T],
        weights: &[f64],
    ) -> EngineResult<&'t T> {
        if items.len() != weights.len() {
            return Err(EngineError::invalid(format!(
                "{} items but {} weights",
                items.len(),
                weights.len()
            )));
        }
        let position = self.weighted_index(index, weights)?;
        Ok(&items[position])
    }

    /// Integer in `[min, max]`: `floor(draw * (max - min + 1)) + min`.
    pub fn bounded_int(&self, index: u64, min: i64, max: i64) -> EngineResult<i64> {
        if min > max {
            return Err(EngineError::invalid(format!(
                "bounded_int range is empty: min {} > max {}",
                min, max
            )));
        }
        let span = i128::from(max) - i128::from(min) + 1;
        let offset = (self.draw(index) * span as f64).floor() as i128;
        // Rounding on spans beyond 2^53 can land one past the end.
        let value = (i128::from(min) + offset).min(i128::from(max));
        Ok(value as i64)
    }

    /// Uniform position in `0..len`; `len` must be non-zero.
    pub(crate) fn bounded_usize(&self, index: u64, len: usize) -> usize {
        let position = (self.draw(index) * len as f64).floor() as usize;
        position.min(len.saturating_sub(1))
    }

    /// Fisher-Yates shuffle of a copy of `items`.
    ///
    /// Swap position `i` (counting down from the end) uses index `base_index + i`,
    /// so each swap is independently addressable.
    pub fn shuffle<T: Clone>(&self, base_index: u64, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.bounded_usize(base_index.wrapping_add(i as u64), i + 1);
            out.swap(i, j);
        }
        out
    }
}
