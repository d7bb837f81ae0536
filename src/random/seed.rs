//! Session seeds.

use std::fmt;
use std::ops::Deref;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Number of random bytes in a generated seed (256 bits).
pub const SEED_BYTES: usize = 32;

/// Opaque, immutable token driving all derived randomness for one isolation scope.
///
/// Generated seeds are 64 lowercase hex characters. Seeds supplied by callers
/// only have to be non-empty; anything shorter than 128 bits of hex is accepted
/// but reported by [`Seed::is_high_entropy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed(String);

impl Seed {
    /// Wrap an existing token.
    pub fn new(token: impl Into<String>) -> EngineResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(EngineError::invalid("seed cannot be empty"));
        }
        Ok(Self(token))
    }

    /// Issue a fresh seed from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the token is hex and carries at least 128 bits.
    pub fn is_high_entropy(&self) -> bool {
        self.0.len() >= 32 && self.0.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Deref for Seed {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Seed {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Seed {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.0
    }
}

impl std::str::FromStr for Seed {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_seed_shape() {
        let seed = Seed::generate();
        assert_eq!(seed.len(), SEED_BYTES * 2);
        assert!(seed.is_high_entropy());
        assert!(seed.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn test_generated_seeds_differ() {
        assert_ne!(Seed::generate(), Seed::generate());
    }

    #[test]
    fn test_empty_seed_rejected() {
        assert!(matches!(Seed::new(""), Err(EngineError::InvalidArgument(_))));
        assert!("".parse::<Seed>().is_err());
    }

    #[test]
    fn test_low_entropy_seed_flagged() {
        let seed = Seed::new("test-seed-123").unwrap();
        assert!(!seed.is_high_entropy());
        assert_eq!(seed.as_str(), "test-seed-123");
    }

    #[test]
    fn test_serde_round_trip_rejects_empty() {
        let seed = Seed::new("abcd").unwrap();
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"abcd\"");
        assert!(serde_json::from_str::<Seed>("\"\"").is_err());
    }

    #[test]
    fn test_generated_seed_decodes_to_full_width() {
        let seed = Seed::generate();
        let bytes = hex::decode(seed.as_str()).unwrap();
        assert_eq!(bytes.len(), SEED_BYTES);
        assert_eq!(hex::encode(&bytes), seed.as_str());
    }
}
