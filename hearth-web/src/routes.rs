//! Route definitions for the Hearth web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
///
/// Nested under the configured API root so the address resolver sees the
/// same prefix the router strips.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/login", post(handlers::login))
        // User-level resources
        .route("/users/{user_id}", get(handlers::get_user))
        // Hub-scoped resources
        .route(
            "/users/{user_id}/hubs/{hub_id}/status",
            get(handlers::hub_status),
        )
        // Server lifecycle
        .route(
            "/admin/shutdown",
            post(handlers::schedule_shutdown).delete(handlers::cancel_shutdown),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppState, WebConfig};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_route() {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        let app = api_routes().with_state(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
