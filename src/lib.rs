//! # KI Fingerprint Engine
//!
//! Deterministic, coherent device identities for browser automation.
//!
//! Every identity is a pure function of a seed and a weighted archetype
//! catalog. The same seed always yields the same [`Profile`]: OS, hardware,
//! display, locale, fonts, user agent and the navigator/WebGL/audio/battery
//! values a page can observe, all consistent with each other. A companion
//! noise injector perturbs canvas pixels on luminance edges only, keyed to
//! the same seed.
//!
//! ## Features
//!
//! - **Seeded Random Field**: order-independent draws addressed by a fixed index
//! - **Coherent Profiles**: platform, vendor, GPU and battery follow the OS and form factor
//! - **Edge-Aware Noise**: one intensity step on Sobel edges, alpha untouched
//! - **Scope Lifecycle**: bounded per-scope seed store with rotation checks
//! - **REST API**: HTTP endpoints for profiles and canvas noise
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust
//! use ki_fingerprint_engine::{config::EngineSettings, IdentityEngine};
//!
//! let engine = IdentityEngine::new(&EngineSettings::default());
//!
//! let profile = engine.get_profile("browser-context-1");
//! assert_eq!(profile.navigator_block.platform, profile.os.platform);
//! assert!(!profile.navigator_block.webdriver);
//! ```
//!
//! ## Module Overview
//!
//! - [`random`]: seeds, FNV-1a hashing and the seeded random field
//! - [`profile`]: archetype catalog, coherence tables and profile synthesis
//! - [`noise`]: Sobel edge mask and canvas perturbation
//! - [`session`]: per-scope seed store
//! - [`engine`]: the [`IdentityEngine`] facade
//! - [`api`]: REST API server
//! - [`config`]: Configuration loading and management
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     IdentityEngine                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌─────────┐             │
//! │  │ Session  │──▶│  Profile  │   │  Noise  │             │
//! │  │Lifecycle │   │Synthesizer│   │Injector │             │
//! │  └──────────┘   └─────┬─────┘   └────┬────┘             │
//! │                       │              │                   │
//! │                 ┌─────┴──────────────┴─────┐             │
//! │                 │   Seeded Random Field    │             │
//! │                 └──────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`KI_FINGERPRINT_*`)
//! 4. CLI arguments
//!
//! See [`config::EngineSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Engine error types.
pub mod error;

/// Seeds and deterministic, index-addressed randomness.
pub mod random;

/// Archetype catalog and coherent profile synthesis.
pub mod profile;

/// Edge-aware canvas noise.
pub mod noise;

/// Per-scope seed retention and rotation.
pub mod session;

/// The identity engine facade.
pub mod engine;

/// REST API server for external callers.
pub mod api;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

pub use engine::IdentityEngine;
pub use error::{EngineError, EngineResult};

// Randomness
pub use random::{Seed, SeededRandomField};

// Profile types
pub use profile::{
    Archetype, ArchetypeCatalog, CatalogLoader, CoherentProfileSynthesizer, FormFactor, OsFamily,
    Profile,
};

// Noise types
pub use noise::{EdgeAwareNoiseInjector, NoiseConfig, PixelBuffer};

// Session types
pub use session::SessionSeedLifecycle;

// API types
pub use api::{ApiServer, AppState};

// Config types
pub use config::{CliArgs, ConfigError, EngineSettings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use ki_fingerprint_engine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, EngineSettings};
    pub use crate::engine::IdentityEngine;
    pub use crate::noise::{EdgeAwareNoiseInjector, PixelBuffer};
    pub use crate::profile::{ArchetypeCatalog, Profile};
    pub use crate::random::Seed;
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
