use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, BasicCredentials};
use crate::error::ApiError;
use crate::state::AppState;

/// HTTP Basic authentication middleware that verifies credentials against the
/// user directory and injects the resulting `Principal` into the request
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(request.headers())?;
    let username = credentials.username.clone();

    // bcrypt verification blocks; run it on the blocking pool
    let users = state.users.clone();
    let principal = tokio::task::spawn_blocking(move || users.authenticate(&credentials))
        .await
        .map_err(|e| {
            tracing::error!("Credential check task failed: {}", e);
            ApiError::internal_server_error("Authentication failed")
        })?
        .map_err(|e| {
            tracing::warn!("Authentication failed for user '{}': {}", username, e);
            ApiError::from(e)
        })?;

    tracing::debug!("Authenticated '{}'", principal.username);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extract Basic credentials from the Authorization header
fn extract_credentials(headers: &HeaderMap) -> Result<BasicCredentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)?;

    BasicCredentials::from_header(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_reported() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_credentials(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn reads_basic_header() {
        let mut headers = HeaderMap::new();
        // "kumar2:xyz789"
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic a3VtYXIyOnh5ejc4OQ=="),
        );
        let creds = extract_credentials(&headers).unwrap();
        assert_eq!(creds.username, "kumar2");
        assert_eq!(creds.password, "xyz789");
    }
}
