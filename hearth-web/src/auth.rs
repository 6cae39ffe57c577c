//! Authentication and authorization plumbing for the web boundary
//!
//! Extracts bearer credentials and resolved addresses from requests, and
//! maps access-control failures onto HTTP responses. Authentication
//! failures answer 401 and authorization failures 403, so callers can tell
//! the two apart.

use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use hearth_access::{resolve, AccessError, Address, Credential, RequestContext};

use crate::AppState;

/// Authentication and authorization failures as seen by HTTP callers
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "missing_credentials",
                "Username and password are required",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid username or password",
            ),
            AuthError::MissingAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "missing_auth_header",
                "Authorization header is required",
            ),
            AuthError::Access(error) => {
                let status = if error.is_authentication() {
                    StatusCode::UNAUTHORIZED
                } else {
                    match error {
                        AccessError::Forbidden => StatusCode::FORBIDDEN,
                        AccessError::Discovery(_) | AccessError::KeyFetch(_) => {
                            StatusCode::BAD_GATEWAY
                        }
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    }
                };
                let message = match error {
                    AccessError::Malformed => "Invalid or malformed token",
                    AccessError::InvalidSignature => "Invalid token signature",
                    AccessError::Expired => "Token has expired",
                    AccessError::Unauthenticated => "Authentication is required",
                    AccessError::Forbidden => "Insufficient role or ownership for this resource",
                    AccessError::TokenCreation => "Failed to create authentication token",
                    AccessError::Discovery(_) => "Identity provider discovery failed",
                    AccessError::KeyFetch(_) => "Identity provider key fetch failed",
                };
                (status, error.code(), message)
            }
        };

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Extract the bearer token from the authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verified bearer credential of the calling user
///
/// Rejects the request when the header is missing or the token does not
/// verify.
pub struct Auth(pub Credential);

impl<S> FromRequestParts<S> for Auth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_bearer(&parts.headers).ok_or(AuthError::MissingAuthHeader)?;

        let credential = app_state
            .tokens
            .verify(token, Utc::now().timestamp())
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                AuthError::Access(e)
            })?;

        Ok(Auth(credential))
    }
}

/// Optional bearer credential
///
/// Absent header yields `None`; a present but invalid token still rejects
/// the request.
pub struct OptionalAuth(pub Option<Credential>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if extract_bearer(&parts.headers).is_none() {
            return Ok(OptionalAuth(None));
        }

        let Auth(credential) = Auth::from_request_parts(parts, state).await?;
        Ok(OptionalAuth(Some(credential)))
    }
}

/// Tenant/hub address resolved from the request path
///
/// Resolution never fails; unrecognizable paths yield an empty address.
pub struct ResolvedAddress(pub Address);

impl<S> FromRequestParts<S> for ResolvedAddress
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(ResolvedAddress(resolve_from_parts(parts, &app_state)))
    }
}

/// The immutable per-request context: resolved address plus optional
/// verified credential, built once here and threaded through the handlers
/// by parameter.
///
/// A missing bearer token is not rejected at extraction; the authorizer
/// answers `Unauthenticated` when the requested capability needs identity.
pub struct RequestScope(pub RequestContext);

impl<S> FromRequestParts<S> for RequestScope
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let address = resolve_from_parts(parts, &app_state);
        let OptionalAuth(credential) = OptionalAuth::from_request_parts(parts, state).await?;

        Ok(RequestScope(RequestContext::new(address, credential)))
    }
}

/// Resolve the address from the original request path
///
/// Nested routers strip the API root from `parts.uri`, so the original URI
/// recorded by the router is preferred.
fn resolve_from_parts(parts: &Parts, state: &AppState) -> Address {
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());

    resolve(Some(state.config.api_root.as_str()), Some(path.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebConfig;
    use axum::body::Body;
    use axum::http::{HeaderValue, Method, Request};
    use hearth_access::Role;

    #[test]
    fn bearer_extraction_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc"));
        assert_eq!(extract_bearer(&headers), None);

        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    async fn test_parts(uri: &str, token: Option<&str>) -> (Parts, AppState) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).unwrap();
        let (parts, _) = request.into_parts();

        let state = AppState::new(WebConfig::default()).await.unwrap();
        (parts, state)
    }

    #[tokio::test]
    async fn auth_extractor_accepts_a_minted_token() {
        let (_, state) = test_parts("/api/v1/users/u1", None).await;
        let token = state
            .tokens
            .mint("u1", &[Role::User].into_iter().collect())
            .unwrap();

        let (mut parts, _) = {
            let request = Request::builder()
                .method(Method::GET)
                .uri("/api/v1/users/u1")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap();
            request.into_parts()
        };

        let Auth(credential) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(credential.subject, "u1");
        assert!(credential.has_role(Role::User));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_a_missing_header() {
        let (mut parts, state) = test_parts("/api/v1/users/u1", None).await;

        let err = Auth::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingAuthHeader));
    }

    #[tokio::test]
    async fn optional_auth_is_none_without_a_header() {
        let (mut parts, state) = test_parts("/api/v1/users/u1", None).await;

        let OptionalAuth(credential) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn optional_auth_still_rejects_an_invalid_token() {
        let (mut parts, state) = test_parts("/api/v1/users/u1", Some("not-a-token")).await;

        let err = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Access(AccessError::Malformed)));
    }

    #[tokio::test]
    async fn resolved_address_extractor_never_fails() {
        let (mut parts, state) = test_parts("/api/v1/health", None).await;

        let ResolvedAddress(address) = ResolvedAddress::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(address.is_empty());
    }

    #[tokio::test]
    async fn request_scope_resolves_the_address() {
        let (mut parts, state) = test_parts("/api/v1/users/u1/hubs/h1/devices", None).await;

        let RequestScope(context) = RequestScope::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(context.address, Address::hub("u1", "h1"));
        assert!(context.is_anonymous());
    }
}
