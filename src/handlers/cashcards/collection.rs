use axum::{
    extract::{Extension, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::Principal;
use crate::config::ApiConfig;
use crate::database::models::{CashCard, CashCardRequest};
use crate::database::{PageError, PageRequest, SortOrder};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Zero-based page number
    pub page: Option<u32>,
    /// Page size; 0 or absent means the configured default
    pub size: Option<u32>,
    /// `<field>[,asc|desc]`, e.g. `amount,desc`
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn to_page_request(&self, api: &ApiConfig) -> Result<PageRequest, PageError> {
        let size = match self.size {
            None | Some(0) => api.default_page_size,
            Some(n) => n.min(api.max_page_size),
        };
        let sort = match self.sort.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => SortOrder::parse(s)?,
            _ => SortOrder::default(),
        };
        Ok(PageRequest::new(self.page.unwrap_or(0), size, sort))
    }
}

/// GET /cashcards - page through the caller's cards
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CashCard>>, ApiError> {
    let page_request = query.to_page_request(&state.api)?;
    let page = state
        .store
        .find_by_owner(&principal.username, &page_request)
        .await?;

    tracing::debug!(
        "Listed {} of {} cards for '{}' (page {})",
        page.content.len(),
        page.total_elements,
        principal.username,
        page.number
    );
    Ok(Json(page.content))
}

/// POST /cashcards - create a card owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    JsonBody(request): JsonBody<CashCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .store
        .create(request.amount, &principal.username)
        .await?;

    tracing::info!("Created card {} for '{}'", card.id, principal.username);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/cashcards/{}", card.id))],
    ))
}
