//! The identity engine facade.
//!
//! [`IdentityEngine`] owns the archetype catalog, the per-scope seed store
//! and the noise injector, and wires them into the operations callers use:
//! profile lookup, regeneration, rotation checks and canvas perturbation.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::noise::EdgeAwareNoiseInjector;
use crate::profile::{
    load_or_fallback, synthesize, ArchetypeCatalog, BundledCatalog, CatalogLoader, FileCatalog,
    Profile,
};
use crate::random::Seed;
use crate::session::SessionSeedLifecycle;

/// Coherent device identities per scope, plus seeded canvas noise.
///
/// The engine is `Send + Sync`; share it behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use ki_fingerprint_engine::IdentityEngine;
///
/// let engine = IdentityEngine::default();
/// let profile = engine.get_profile("context-1");
///
/// // Same scope, same identity.
/// assert_eq!(profile, engine.get_profile("context-1"));
///
/// // Regeneration issues a new seed.
/// let fresh = engine.regenerate_profile("context-1");
/// assert_ne!(profile.seed, fresh.seed);
/// ```
#[derive(Debug)]
pub struct IdentityEngine {
    catalog: ArchetypeCatalog,
    lifecycle: SessionSeedLifecycle,
    injector: EdgeAwareNoiseInjector,
    rotation_max_age_ms: u64,
}

impl Default for IdentityEngine {
    fn default() -> Self {
        Self::with_catalog(load_or_fallback(&BundledCatalog), &EngineSettings::default())
    }
}

impl IdentityEngine {
    /// Builds an engine from settings.
    ///
    /// The catalog comes from `catalog_path` when set, otherwise from the
    /// bundled catalog. A catalog that cannot be loaded is replaced by the
    /// single built-in archetype.
    pub fn new(settings: &EngineSettings) -> Self {
        let catalog = match settings.catalog_path {
            Some(ref path) => load_or_fallback(&FileCatalog::new(path)),
            None => load_or_fallback(&BundledCatalog),
        };
        Self::with_catalog(catalog, settings)
    }

    /// Builds an engine around an already loaded catalog.
    pub fn with_catalog(catalog: ArchetypeCatalog, settings: &EngineSettings) -> Self {
        info!(
            archetypes = catalog.len(),
            max_scopes = settings.max_scopes,
            edge_threshold = settings.edge_threshold,
            noise_level = settings.noise_level,
            "Identity engine ready"
        );
        Self {
            catalog,
            lifecycle: SessionSeedLifecycle::new(settings.max_scopes),
            injector: EdgeAwareNoiseInjector::new(settings.noise_config()),
            rotation_max_age_ms: settings.rotation_max_age_ms,
        }
    }

    /// Builds an engine whose catalog comes from `loader`.
    pub fn from_loader(loader: &dyn CatalogLoader, settings: &EngineSettings) -> Self {
        Self::with_catalog(load_or_fallback(loader), settings)
    }

    /// The scope's profile, synthesized on first access and memoised after.
    ///
    /// Never fails.
    pub fn get_profile(&self, scope: &str) -> Arc<Profile> {
        let seed = self.lifecycle.get_seed(scope);
        if let Some(profile) = self.lifecycle.cached_profile(scope, &seed) {
            return profile;
        }
        let profile = Arc::new(synthesize(&seed, &self.catalog));
        debug!(scope, archetype = %profile.archetype_name, "synthesized profile");
        self.lifecycle.store_profile(scope, &seed, profile)
    }

    /// Discards the scope's identity and synthesizes a new one from a fresh seed.
    pub fn regenerate_profile(&self, scope: &str) -> Arc<Profile> {
        let seed = self.lifecycle.regenerate(scope);
        info!(scope, "regenerated identity");
        self.memoise(scope, seed)
    }

    /// Pins `seed` to `scope` and returns the profile it produces.
    pub fn pin_seed(&self, scope: &str, seed: Seed) -> Arc<Profile> {
        let seed = self.lifecycle.set_seed(scope, seed);
        self.memoise(scope, seed)
    }

    /// The profile `seed` produces, without touching any scope.
    pub fn profile_for_seed(&self, seed: &Seed) -> Profile {
        synthesize(seed, &self.catalog)
    }

    fn memoise(&self, scope: &str, seed: Seed) -> Arc<Profile> {
        let profile = Arc::new(synthesize(&seed, &self.catalog));
        self.lifecycle.store_profile(scope, &seed, profile)
    }

    /// The scope's seed, issued on first access.
    pub fn seed_for(&self, scope: &str) -> Seed {
        self.lifecycle.get_seed(scope)
    }

    /// Perturbs edge pixels of `rgba` under `seed`.
    ///
    /// A malformed buffer is logged and returned unchanged.
    pub fn perturb_pixels<'a>(
        &self,
        seed: &Seed,
        width: u32,
        height: u32,
        rgba: &'a [u8],
    ) -> Cow<'a, [u8]> {
        self.injector.perturb(seed, width, height, rgba)
    }

    /// Like [`perturb_pixels`](Self::perturb_pixels) but rejects malformed buffers.
    pub fn try_perturb_pixels<'a>(
        &self,
        seed: &Seed,
        width: u32,
        height: u32,
        rgba: &'a [u8],
    ) -> EngineResult<Cow<'a, [u8]>> {
        self.injector.try_perturb(seed, width, height, rgba)
    }

    /// Perturbs `rgba` under the scope's own seed.
    pub fn perturb_for_scope<'a>(
        &self,
        scope: &str,
        width: u32,
        height: u32,
        rgba: &'a [u8],
    ) -> Cow<'a, [u8]> {
        let seed = self.lifecycle.get_seed(scope);
        self.injector.perturb(&seed, width, height, rgba)
    }

    /// True when the scope's seed is at least `max_age_ms` old.
    pub fn should_rotate(&self, scope: &str, max_age_ms: u64) -> bool {
        self.lifecycle.should_rotate(scope, max_age_ms)
    }

    /// [`should_rotate`](Self::should_rotate) with the configured window.
    pub fn should_rotate_default(&self, scope: &str) -> bool {
        self.should_rotate(scope, self.rotation_max_age_ms)
    }

    pub fn rotation_max_age_ms(&self) -> u64 {
        self.rotation_max_age_ms
    }

    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    pub fn lifecycle(&self) -> &SessionSeedLifecycle {
        &self.lifecycle
    }

    pub fn injector(&self) -> &EdgeAwareNoiseInjector {
        &self.injector
    }

    /// Number of scopes currently holding a seed.
    pub fn scope_count(&self) -> usize {
        self.lifecycle.len()
    }
}
