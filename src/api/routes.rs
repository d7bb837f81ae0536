//! REST API routes and handlers
//!
//! Exposes profile lookup, regeneration, rotation checks and canvas noise.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::profile::Profile;
use crate::random::Seed;

// ============================================================================
// Request/Response Structs
// ============================================================================

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub scopes: usize,
    pub archetypes: usize,
}

/// Rotation query parameters
#[derive(Debug, Deserialize)]
pub struct RotationQuery {
    #[serde(default)]
    pub max_age_ms: Option<u64>,
}

/// Rotation check response
#[derive(Debug, Serialize, Deserialize)]
pub struct RotationResponse {
    pub scope: String,
    pub max_age_ms: u64,
    pub should_rotate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_age_ms: Option<i64>,
}

/// Perturb request
#[derive(Debug, Deserialize)]
pub struct PerturbRequest {
    pub seed: String,
    pub width: u32,
    pub height: u32,
    /// Base64 encoded RGBA8 pixels, row-major
    pub rgba: String,
}

/// Perturb response
#[derive(Debug, Serialize, Deserialize)]
pub struct PerturbResponse {
    /// Base64 encoded RGBA8 pixels
    pub rgba: String,
    /// Whether any byte differs from the input
    pub changed: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scopes: state.engine.scope_count(),
        archetypes: state.engine.catalog().len(),
    }))
}

/// GET /scopes/:scope/profile - Current profile of a scope
pub async fn get_profile(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Json<ApiResponse<Profile>> {
    let profile = state.engine.get_profile(&scope);
    Json(ApiResponse::success(Profile::clone(&profile)))
}

/// POST /scopes/:scope/regenerate - Replace a scope's identity
pub async fn regenerate_profile(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Json<ApiResponse<Profile>> {
    let profile = state.engine.regenerate_profile(&scope);
    info!("Regenerated identity for scope '{}' by request", scope);
    Json(ApiResponse::success(Profile::clone(&profile)))
}

/// GET /scopes/:scope/rotation - Whether a scope's seed is due for rotation
pub async fn rotation_status(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Query(query): Query<RotationQuery>,
) -> impl IntoResponse {
    let max_age_ms = query
        .max_age_ms
        .unwrap_or_else(|| state.engine.rotation_max_age_ms());
    let should_rotate = state.engine.should_rotate(&scope, max_age_ms);
    let seed_age_ms = state
        .engine
        .lifecycle()
        .seed_age(&scope)
        .map(|age| age.num_milliseconds());

    Json(ApiResponse::success(RotationResponse {
        scope,
        max_age_ms,
        should_rotate,
        seed_age_ms,
    }))
}

/// POST /noise/perturb - Apply seeded edge noise to an RGBA buffer
pub async fn perturb(
    State(state): State<AppState>,
    Json(request): Json<PerturbRequest>,
) -> impl IntoResponse {
    let seed = match Seed::new(request.seed) {
        Ok(seed) => seed,
        Err(e) => return bad_request(e.to_string()),
    };

    let rgba = match BASE64.decode(request.rgba.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(format!("Invalid base64 pixel data: {}", e)),
    };

    match state
        .engine
        .try_perturb_pixels(&seed, request.width, request.height, &rgba)
    {
        Ok(out) => {
            let changed = out[..] != rgba[..];
            Json(ApiResponse::success(PerturbResponse {
                rgba: BASE64.encode(&out),
                changed,
            }))
            .into_response()
        }
        Err(e) => bad_request(e.to_string()),
    }
}

fn bad_request(message: String) -> axum::response::Response {
    warn!("Rejected perturb request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<PerturbResponse>::error(message)),
    )
        .into_response()
}

// ============================================================================
// Router Configuration
// ============================================================================

/// Create the API router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Scope identities
        .route("/scopes/:scope/profile", get(get_profile))
        .route("/scopes/:scope/regenerate", post(regenerate_profile))
        .route("/scopes/:scope/rotation", get(rotation_status))

        // Canvas noise
        .route("/noise/perturb", post(perturb))

        .with_state(state)
}
