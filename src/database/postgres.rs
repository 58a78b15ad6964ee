use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};

use super::manager::{self, DatabaseError};
use super::models::CashCard;
use super::page::{Page, PageRequest, SortOrder};
use super::store::CardStore;

/// `cash_card` table in PostgreSQL.
#[derive(Clone)]
pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, create the schema if needed and wrap the pool.
    pub async fn connect(config: &crate::config::DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = manager::connect(config).await?;
        manager::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Insert cards with their explicit ids, skipping ids already present, then
    /// move the id sequence past the highest stored id.
    pub async fn seed(&self, cards: &[CashCard]) -> Result<(), DatabaseError> {
        for card in cards {
            sqlx::query(
                "INSERT INTO cash_card (id, amount, owner) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
            )
            .bind(card.id)
            .bind(card.amount)
            .bind(&card.owner)
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('cash_card', 'id'), COALESCE((SELECT MAX(id) FROM cash_card), 0) + 1, false)",
        )
        .execute(&self.pool)
        .await?;

        info!("Seeded {} fixture cards", cards.len());
        Ok(())
    }

    async fn fetch_page(
        &self,
        owner: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<CashCard>, DatabaseError> {
        let (sql, count_sql) = page_queries(owner.is_some(), &page.sort);
        debug!("Card page query: {}", sql);

        let limit = i64::from(page.size);
        let offset = i64::try_from(page.offset())
            .map_err(|_| DatabaseError::QueryError("page offset out of range".to_string()))?;

        let mut query = sqlx::query_as::<_, CashCard>(&sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(owner) = owner {
            query = query.bind(owner);
            count = count.bind(owner);
        }

        let content = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total: i64 = count.fetch_one(&self.pool).await?;

        Ok(Page {
            content,
            number: page.page,
            size: page.size,
            total_elements: u64::try_from(total).unwrap_or_default(),
        })
    }
}

/// Page query and matching count query. When `scoped`, `$1` is the owner and
/// LIMIT/OFFSET shift to `$2`/`$3`.
fn page_queries(scoped: bool, sort: &SortOrder) -> (String, String) {
    let (filter, limit_param, offset_param) = if scoped {
        (" WHERE owner = $1", "$2", "$3")
    } else {
        ("", "$1", "$2")
    };

    let sql = format!(
        "SELECT id, amount, owner FROM cash_card{} {} LIMIT {} OFFSET {}",
        filter,
        sort.to_sql(),
        limit_param,
        offset_param
    );
    let count_sql = format!("SELECT COUNT(*) FROM cash_card{}", filter);
    (sql, count_sql)
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn create(&self, amount: Decimal, owner: &str) -> Result<CashCard, DatabaseError> {
        let card = sqlx::query_as::<_, CashCard>(
            "INSERT INTO cash_card (amount, owner) VALUES ($1, $2) RETURNING id, amount, owner",
        )
        .bind(amount)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(card)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CashCard>, DatabaseError> {
        let card = sqlx::query_as::<_, CashCard>(
            "SELECT id, amount, owner FROM cash_card WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<CashCard>, DatabaseError> {
        self.fetch_page(None, page).await
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
    ) -> Result<Option<CashCard>, DatabaseError> {
        let card = sqlx::query_as::<_, CashCard>(
            "SELECT id, amount, owner FROM cash_card WHERE id = $1 AND owner = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }

    async fn find_by_owner(
        &self,
        owner: &str,
        page: &PageRequest,
    ) -> Result<Page<CashCard>, DatabaseError> {
        self.fetch_page(Some(owner), page).await
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM cash_card WHERE id = $1 AND owner = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn update(&self, id: i64, amount: Decimal, owner: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE cash_card SET amount = $1 WHERE id = $2 AND owner = $3")
            .bind(amount)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM cash_card WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
