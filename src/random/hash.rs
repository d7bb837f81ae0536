//! 32-bit FNV-1a mixing hash.
//!
//! Every deterministic draw in the engine bottoms out here. Only byte-wise XOR
//! and wrapping 32-bit multiplication are used, so results are identical on
//! every platform.

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// 2^32, the normalisation divisor for unit-interval draws.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Incremental FNV-1a state.
///
/// `Copy` so a prefix (e.g. the seed) can be hashed once and forked for many keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a(u32);

impl Fnv1a {
    /// Fresh state at the offset basis.
    pub const fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    /// Fold `bytes` into the state.
    #[inline]
    pub fn update(mut self, bytes: &[u8]) -> Self {
        for &byte in bytes {
            self.0 ^= u32::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
        self
    }

    /// Fold a `u32` as four little-endian bytes.
    #[inline]
    pub fn update_u32(self, value: u32) -> Self {
        self.update(&value.to_le_bytes())
    }

    /// Fold the decimal ASCII rendering of `value` without allocating.
    #[inline]
    pub fn update_decimal(self, value: u64) -> Self {
        let mut digits = [0u8; 20];
        let mut pos = digits.len();
        let mut rest = value;
        loop {
            pos -= 1;
            digits[pos] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        self.update(&digits[pos..])
    }

    /// The raw 32-bit hash.
    #[inline]
    pub fn finish(self) -> u32 {
        self.0
    }

    /// The hash normalised into `[0, 1)`.
    #[inline]
    pub fn unit(self) -> f64 {
        f64::from(self.0) / TWO_POW_32
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot FNV-1a over `bytes`.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    Fnv1a::new().update(bytes).finish()
}
