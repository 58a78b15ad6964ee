use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::{Principal, CARD_OWNER_ROLE};
use crate::error::ApiError;

/// Middleware that admits only principals holding the `card-owner` role.
/// Must run after `basic_auth_middleware`.
pub async fn require_card_owner(request: Request, next: Next) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required before role check"))?;

    if !principal.has_role(CARD_OWNER_ROLE) {
        tracing::warn!(
            "Role check failed: user '{}' lacks role '{}'",
            principal.username,
            CARD_OWNER_ROLE
        );
        return Err(ApiError::forbidden(format!(
            "User '{}' is not a card owner",
            principal.username
        )));
    }

    Ok(next.run(request).await)
}
