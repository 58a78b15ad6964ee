use async_trait::async_trait;
use rust_decimal::Decimal;

use super::manager::DatabaseError;
use super::models::CashCard;
use super::page::{Page, PageRequest};

/// Persistence port for cash cards.
///
/// Every owner-scoped method takes the owner from the caller (the
/// authenticated principal), never from request input. Lookups that do not
/// match both id and owner behave as if the card did not exist.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Persist a new card under a freshly assigned id.
    async fn create(&self, amount: Decimal, owner: &str) -> Result<CashCard, DatabaseError>;

    /// Unscoped lookup by id. Not reachable from any HTTP route.
    async fn find_by_id(&self, id: i64) -> Result<Option<CashCard>, DatabaseError>;

    /// Unscoped page over every card. Not reachable from any HTTP route.
    async fn find_all(&self, page: &PageRequest) -> Result<Page<CashCard>, DatabaseError>;

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
    ) -> Result<Option<CashCard>, DatabaseError>;

    async fn find_by_owner(
        &self,
        owner: &str,
        page: &PageRequest,
    ) -> Result<Page<CashCard>, DatabaseError>;

    /// Existence check that never loads the card body.
    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, DatabaseError>;

    /// Replace the amount of the card matching `id` and `owner`.
    /// Returns `false` when no such card exists.
    async fn update(&self, id: i64, amount: Decimal, owner: &str) -> Result<bool, DatabaseError>;

    /// Idempotent; ownership must already have been checked by the caller.
    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
