//! Route handlers.
//!
//! Handlers only see requests that already passed the guard; `/status` handlers can
//! rely on an [`AuthContext`] extension being present.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::http::validation::{clamp_limit, validate_client_name};
use crate::security::AuthContext;
use crate::store::StatusCheck;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct StatusCheckCreate {
    pub client_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Hello World",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    match state.store.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": timestamp,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, backend = state.store.backend(), "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "timestamp": timestamp,
                })),
            )
                .into_response()
        }
    }
}

pub async fn create_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StatusCheckCreate>, JsonRejection>,
) -> Result<Json<StatusCheck>, ApiError> {
    let Json(input) = payload.map_err(json_rejection)?;
    let client_name = validate_client_name(&input.client_name).map_err(ApiError::Validation)?;

    let check = StatusCheck::new(client_name);
    state.store.insert(check.to_document(&auth.user_id)).await?;

    tracing::info!(
        id = %check.id,
        user = %auth.user_id,
        token = %auth.token_preview,
        "Status check created"
    );
    Ok(Json(check))
}

pub async fn list_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<StatusCheck>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);

    let docs = state.store.find_recent(limit).await?;
    let checks: Vec<StatusCheck> = docs
        .into_iter()
        .filter_map(|doc| match StatusCheck::try_from(doc) {
            Ok(check) => Some(check),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Skipping unreadable status check");
                None
            }
        })
        .collect();

    tracing::debug!(user = %auth.user_id, limit, returned = checks.len(), "Listed status checks");
    Ok(Json(checks))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Validation(rejection.body_text())
    }
}
