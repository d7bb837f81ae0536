//! REST API module for ki-fingerprint-engine
//!
//! Serves scope profiles, regeneration, rotation checks and canvas noise
//! over HTTP.

pub mod routes;
pub mod server;

pub use routes::{create_router, ApiResponse};
pub use server::{ApiServer, AppState};
