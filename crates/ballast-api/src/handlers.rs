//! REST API handlers.
//!
//! Error responses share one JSON shape:
//! `{"success": false, "error": "...", "currentStatus": {...}}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ballast_reconcile::{ErrorKind, ReconcileError, StatusSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::ApiState;

/// Scale request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRequest {
    /// Signed so a negative value is reported as such instead of as a
    /// decode failure.
    pub target_capacity: i64,
}

/// Response body for `/scale` and for `/status` failures.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_status: Option<CurrentStatus>,
}

/// Provider view attached to a failed scale response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStatus {
    pub current_capacity: u32,
    pub status: String,
    pub instance_id: String,
    pub resource_id: String,
    pub resource_alias: String,
}

impl From<&StatusSnapshot> for CurrentStatus {
    fn from(s: &StatusSnapshot) -> Self {
        Self {
            current_capacity: s.current_capacity,
            status: s.status.to_string(),
            instance_id: s.instance_id.clone(),
            resource_id: s.resource_id.clone(),
            resource_alias: s.resource_alias.clone(),
        }
    }
}

/// HTTP status for a reconciler failure.
pub fn status_code(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ProviderUnavailable | ErrorKind::ProviderRejected => StatusCode::BAD_GATEWAY,
        ErrorKind::PollTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::ResourceFailed | ErrorKind::MutationFailed => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(msg: String, status: StatusCode) -> Response {
    (
        status,
        Json(ScaleResponse {
            error: Some(msg),
            ..ScaleResponse::default()
        }),
    )
        .into_response()
}

// ── Scaling ────────────────────────────────────────────────────

/// POST /scale
pub async fn scale(
    State(state): State<ApiState>,
    payload: Result<Json<ScaleRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return error_response(
                format!("Invalid JSON: {}", rejection.body_text()),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let target = match u32::try_from(req.target_capacity) {
        Ok(target) => target,
        Err(_) if req.target_capacity < 0 => {
            return error_response(
                "Target capacity must be non-negative".to_string(),
                StatusCode::BAD_REQUEST,
            );
        }
        Err(_) => {
            return error_response(
                format!("Target capacity must not exceed {}", u32::MAX),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let cancel = state.shutdown.child_token();
    match state.reconciler.scale_to_target(target, &cancel).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ScaleResponse {
                success: true,
                message: Some(format!(
                    "Successfully scaled to target capacity: {target}"
                )),
                ..ScaleResponse::default()
            }),
        )
            .into_response(),
        Err(e) => scale_failure(&state, e).await,
    }
}

async fn scale_failure(state: &ApiState, err: ReconcileError) -> Response {
    warn!(error = %err, "scaling failed");

    let kind = err.kind();
    let message = match kind {
        ErrorKind::Conflict => {
            "A scaling operation is already in progress. Please wait for it to complete."
                .to_string()
        }
        _ => format!("Scaling failed: {err}"),
    };

    let current_status = state
        .reconciler
        .get_status(&state.shutdown.child_token())
        .await
        .ok()
        .map(|s| CurrentStatus::from(&s));

    (
        status_code(kind),
        Json(ScaleResponse {
            error: Some(message),
            current_status,
            ..ScaleResponse::default()
        }),
    )
        .into_response()
}

// ── Status ─────────────────────────────────────────────────────

/// GET /status
pub async fn status(State(state): State<ApiState>) -> Response {
    match state.reconciler.get_status(&state.shutdown.child_token()).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to get current capacity");
            error_response(
                format!("Failed to get current capacity: {e}"),
                status_code(e.kind()),
            )
        }
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "service": "autoscaler" }))
}
