//! Configuration module for ki-fingerprint-engine.
//!
//! This module provides configuration management for the engine, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument merging
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use ki_fingerprint_engine::config::EngineSettings;
//!
//! let settings = EngineSettings::from_file("fingerprint.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, EngineSettings, ENV_PREFIX};
