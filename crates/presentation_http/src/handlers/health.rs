//! Health check handlers

use axum::{Extension, Json, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::view::ERROR_TEMPLATE;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub templates: ComponentStatus,
    pub pdf: ComponentStatus,
}

/// Status of one optional component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub configured: bool,
    pub healthy: bool,
}

impl ComponentStatus {
    const ABSENT: Self = Self {
        configured: false,
        healthy: false,
    };
}

/// Readiness check - is the server ready to accept requests?
///
/// A renderer must be configured. The PDF generator is optional, but when
/// configured its binary must be runnable.
pub async fn readiness_check(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let templates = state
        .templates
        .as_ref()
        .map_or(ComponentStatus::ABSENT, |renderer| ComponentStatus {
            configured: true,
            healthy: renderer.has_template(ERROR_TEMPLATE),
        });

    let pdf = match &state.pdf {
        Some(generator) => ComponentStatus {
            configured: true,
            healthy: generator.is_available().await,
        },
        None => ComponentStatus::ABSENT,
    };

    let ready = templates.configured && (!pdf.configured || pdf.healthy);
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            ready,
            templates,
            pdf,
        }),
    )
}
