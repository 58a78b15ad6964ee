use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::Principal;
use crate::database::models::{CashCard, CashCardRequest};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;

/// GET /cashcards/:id - fetch one of the caller's cards
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<CashCard>, ApiError> {
    state
        .store
        .find_by_id_and_owner(id, &principal.username)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /cashcards/:id - replace the amount of one of the caller's cards.
/// Id and owner come from the stored card, never from the body.
pub async fn put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<CashCardRequest>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .store
        .find_by_id_and_owner(id, &principal.username)
        .await?
        .ok_or(ApiError::NotFound)?;

    let updated = state
        .store
        .update(existing.id, request.amount, &existing.owner)
        .await?;
    if !updated {
        // Deleted between the lookup and the write
        return Err(ApiError::NotFound);
    }

    tracing::info!("Updated card {} for '{}'", existing.id, existing.owner);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cashcards/:id - remove one of the caller's cards
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state
        .store
        .exists_by_id_and_owner(id, &principal.username)
        .await?
    {
        return Err(ApiError::NotFound);
    }

    state.store.delete_by_id(id).await?;

    tracing::info!("Deleted card {} for '{}'", id, principal.username);
    Ok(StatusCode::NO_CONTENT)
}
