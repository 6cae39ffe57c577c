//! HTTP request handlers for the Hearth web server
//!
//! Every authenticated handler receives its [`RequestScope`]: the address
//! resolved from the path plus the verified credential, built once per
//! request and passed to the authorizer.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use hearth_access::{evaluate, Capability, Freshness};

use crate::accounts::{AccountInfo, AuthResponse, LoginRequest};
use crate::auth::{AuthError, RequestScope};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: String,
}

/// Health check endpoint (unauthenticated)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// User login endpoint
///
/// Authenticate with username and password; returns a bearer token and the
/// subject identity. Missing fields answer 400, bad credentials 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    info!("Login attempt: {}", request.username);

    let response = state.accounts.login(request)?;

    info!("User logged in successfully: {}", response.user.username);
    Ok(Json(response))
}

/// User-level resource
///
/// Requires the `manage_account` capability; non-admin callers only reach
/// their own account.
pub async fn get_user(
    State(state): State<AppState>,
    RequestScope(context): RequestScope,
    Path(user_id): Path<String>,
) -> Result<Json<AccountInfo>, Response> {
    state
        .authorizer
        .authorize(
            &context.address,
            context.credential.as_ref(),
            Capability::ManageAccount,
        )
        .map_err(|e| AuthError::from(e).into_response())?;

    let account = state.accounts.get(&user_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("No account with id {}", user_id),
            })),
        )
            .into_response()
    })?;

    Ok(Json(account))
}

/// Aggregate hub status with conditional-response support
///
/// Requires the `view_hub` capability on the addressed hub. The response
/// carries an `ETag` computed over the hub's entity modification stamps; a
/// request presenting that tag in `If-None-Match` answers `304 Not
/// Modified` without a body.
pub async fn hub_status(
    State(state): State<AppState>,
    RequestScope(context): RequestScope,
    Path((user_id, hub_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = state.authorizer.authorize(
        &context.address,
        context.credential.as_ref(),
        Capability::ViewHub,
    ) {
        return AuthError::from(e).into_response();
    }

    let Some(snapshot) = state.hubs.snapshot(&user_id, &hub_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("No hub {} for user {}", hub_id, user_id),
            })),
        )
            .into_response();
    };

    let presented = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());

    match evaluate(presented, &snapshot.entries) {
        Freshness::NotModified => {
            // the presented tag equals the fresh one here
            let tag = presented.unwrap_or_default().to_string();
            (StatusCode::NOT_MODIFIED, [(header::ETAG, tag)]).into_response()
        }
        Freshness::Modified(tag) => {
            let body = Json(json!({
                "hub_id": snapshot.hub_id,
                "name": snapshot.name,
                "entities": snapshot.entries,
            }));
            (StatusCode::OK, [(header::ETAG, tag)], body).into_response()
        }
    }
}

/// Schedule a deferred server shutdown
///
/// Requires the `manage_server` capability. The shutdown fires after the
/// configured delay, decoupled from this response, and can be cancelled
/// until then.
pub async fn schedule_shutdown(
    State(state): State<AppState>,
    RequestScope(context): RequestScope,
) -> Result<Json<serde_json::Value>, AuthError> {
    state.authorizer.authorize(
        &context.address,
        context.credential.as_ref(),
        Capability::ManageServer,
    )?;

    let delay = state.shutdown.schedule();
    info!("Shutdown scheduled by {}", context.subject().unwrap_or("unknown"));

    Ok(Json(json!({
        "status": "scheduled",
        "delay_secs": delay.as_secs(),
    })))
}

/// Cancel a scheduled server shutdown
pub async fn cancel_shutdown(
    State(state): State<AppState>,
    RequestScope(context): RequestScope,
) -> Result<Json<serde_json::Value>, AuthError> {
    state.authorizer.authorize(
        &context.address,
        context.credential.as_ref(),
        Capability::ManageServer,
    )?;

    let cancelled = state.shutdown.cancel();
    info!(
        "Shutdown cancellation by {}: {}",
        context.subject().unwrap_or("unknown"),
        if cancelled { "cancelled" } else { "nothing pending" }
    );

    Ok(Json(json!({
        "status": if cancelled { "cancelled" } else { "idle" },
    })))
}
