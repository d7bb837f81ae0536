//! Device identity profiles.
//!
//! - `catalog` - weighted archetype catalog and its loaders
//! - `tables` - fixed coherence tables (OS families, CPU tiers, GPU vendors)
//! - `synthesizer` - seed + catalog to [`Profile`]
//! - `types` - the profile and its derived blocks
//!
//! # Example
//!
//! ```rust
//! use ki_fingerprint_engine::profile::{synthesize, ArchetypeCatalog};
//! use ki_fingerprint_engine::random::Seed;
//!
//! let catalog = ArchetypeCatalog::fallback();
//! let profile = synthesize(&Seed::generate(), &catalog);
//!
//! assert_eq!(profile.os.platform, "Win32");
//! assert!(!profile.navigator_block.webdriver);
//! ```

pub mod catalog;
pub mod synthesizer;
pub mod tables;
pub mod types;

pub use catalog::{
    load_or_fallback, Archetype, ArchetypeCatalog, BundledCatalog, CatalogLoader, FileCatalog,
};
pub use synthesizer::{synthesize, CoherentProfileSynthesizer};
pub use tables::{FormFactor, GpuVendor, HardwareDefaults, OsFamily};
pub use types::{
    AudioBlock, DisplayInfo, GpuInfo, GraphicsBlock, HardwareInfo, LocaleInfo, NavigatorBlock,
    OsInfo, PowerBlock, Profile,
};
