//! Per-scope seed retention.
//!
//! A scope is any caller-chosen key (a browser context, a tab group, a user
//! id). Each scope owns one seed and, once computed, the profile built from
//! that seed. The store is bounded; when it is full the scope with the oldest
//! seed is evicted to make room.
//!
//! # Example
//!
//! ```rust
//! use ki_fingerprint_engine::session::SessionSeedLifecycle;
//!
//! let lifecycle = SessionSeedLifecycle::new(16);
//! let first = lifecycle.get_seed("tab-group-1");
//! assert_eq!(first, lifecycle.get_seed("tab-group-1"));
//!
//! let fresh = lifecycle.regenerate("tab-group-1");
//! assert_ne!(first, fresh);
//! assert!(!lifecycle.should_rotate("unknown-scope", 0));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::profile::Profile;
use crate::random::Seed;

/// Default upper bound on retained scopes.
pub const DEFAULT_MAX_SCOPES: usize = 256;

#[derive(Debug, Clone)]
struct ScopeEntry {
    seed: Seed,
    created_at: DateTime<Utc>,
    /// Memo of the profile built from `seed`; dropped whenever `seed` changes.
    profile: Option<Arc<Profile>>,
}

impl ScopeEntry {
    fn new(seed: Seed, created_at: DateTime<Utc>) -> Self {
        Self {
            seed,
            created_at,
            profile: None,
        }
    }
}

/// Thread-safe, bounded map from scope to seed.
///
/// All state sits behind one `parking_lot::Mutex`, held only for map access.
#[derive(Debug)]
pub struct SessionSeedLifecycle {
    scopes: Mutex<HashMap<String, ScopeEntry>>,
    max_scopes: usize,
}

impl Default for SessionSeedLifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCOPES)
    }
}

impl SessionSeedLifecycle {
    /// Creates a store holding at most `max_scopes` scopes (at least one).
    pub fn new(max_scopes: usize) -> Self {
        Self {
            scopes: Mutex::new(HashMap::new()),
            max_scopes: max_scopes.max(1),
        }
    }

    pub fn max_scopes(&self) -> usize {
        self.max_scopes
    }

    /// Returns the scope's seed, issuing one on first access.
    pub fn get_seed(&self, scope: &str) -> Seed {
        self.get_seed_at(scope, Utc::now())
    }

    pub(crate) fn get_seed_at(&self, scope: &str, now: DateTime<Utc>) -> Seed {
        let mut scopes = self.scopes.lock();
        if let Some(entry) = scopes.get(scope) {
            return entry.seed.clone();
        }
        let seed = Seed::generate();
        self.insert_locked(&mut scopes, scope, ScopeEntry::new(seed.clone(), now));
        debug!(scope, "issued seed");
        seed
    }

    /// Discards the scope's seed and profile and issues a fresh seed.
    pub fn regenerate(&self, scope: &str) -> Seed {
        self.replace_seed_at(scope, Seed::generate(), Utc::now())
    }

    /// Pins `seed` to `scope`, dropping any previous seed and profile.
    ///
    /// # Arguments
    ///
    /// * `scope` - The scope key
    /// * `seed` - Seed to use from now on
    pub fn set_seed(&self, scope: &str, seed: Seed) -> Seed {
        self.replace_seed_at(scope, seed, Utc::now())
    }

    pub(crate) fn replace_seed_at(&self, scope: &str, seed: Seed, now: DateTime<Utc>) -> Seed {
        let mut scopes = self.scopes.lock();
        scopes.remove(scope);
        self.insert_locked(&mut scopes, scope, ScopeEntry::new(seed.clone(), now));
        debug!(scope, "replaced seed");
        seed
    }

    /// True when the scope's seed is at least `max_age_ms` old.
    ///
    /// Unknown scopes never need rotation; they get a fresh seed on first use.
    pub fn should_rotate(&self, scope: &str, max_age_ms: u64) -> bool {
        self.should_rotate_at(scope, max_age_ms, Utc::now())
    }

    pub(crate) fn should_rotate_at(
        &self,
        scope: &str,
        max_age_ms: u64,
        now: DateTime<Utc>,
    ) -> bool {
        let scopes = self.scopes.lock();
        match scopes.get(scope) {
            Some(entry) => {
                let age_ms = (now - entry.created_at).num_milliseconds().max(0) as u64;
                age_ms >= max_age_ms
            }
            None => false,
        }
    }

    /// Time since the scope's seed was issued.
    pub fn seed_age(&self, scope: &str) -> Option<chrono::Duration> {
        let created_at = self.scopes.lock().get(scope)?.created_at;
        Some(Utc::now() - created_at)
    }

    /// The memoised profile, provided it was built from `seed`.
    pub fn cached_profile(&self, scope: &str, seed: &Seed) -> Option<Arc<Profile>> {
        let scopes = self.scopes.lock();
        let entry = scopes.get(scope)?;
        if &entry.seed != seed {
            return None;
        }
        entry.profile.clone()
    }

    /// Memoise `profile` for `scope` if the scope still holds `seed`.
    ///
    /// Returns the profile callers should use: an earlier memo wins over
    /// `profile` so concurrent callers converge on one `Arc`. If the scope has
    /// moved on to another seed, `profile` is returned without being stored.
    pub fn store_profile(
        &self,
        scope: &str,
        seed: &Seed,
        profile: Arc<Profile>,
    ) -> Arc<Profile> {
        let mut scopes = self.scopes.lock();
        match scopes.get_mut(scope) {
            Some(entry) if &entry.seed == seed => match &entry.profile {
                Some(existing) => Arc::clone(existing),
                None => {
                    entry.profile = Some(Arc::clone(&profile));
                    profile
                }
            },
            _ => profile,
        }
    }

    /// Removes the scope. Returns whether it existed.
    pub fn evict(&self, scope: &str) -> bool {
        let removed = self.scopes.lock().remove(scope).is_some();
        if removed {
            debug!(scope, "evicted scope");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.scopes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.lock().is_empty()
    }

    /// Scope keys, sorted.
    pub fn scopes(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.scopes.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn insert_locked(
        &self,
        scopes: &mut HashMap<String, ScopeEntry>,
        scope: &str,
        entry: ScopeEntry,
    ) {
        while scopes.len() >= self.max_scopes {
            let oldest = scopes
                .iter()
                .min_by(|(ka, a), (kb, b)| {
                    a.created_at.cmp(&b.created_at).then_with(|| ka.cmp(kb))
                })
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    scopes.remove(&key);
                    debug!(scope = %key, "evicted oldest scope");
                }
                None => break,
            }
        }
        scopes.insert(scope.to_string(), entry);
    }
}
