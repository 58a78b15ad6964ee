use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored cash card. `owner` stays server-side and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CashCard {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip)]
    pub owner: String,
}

impl CashCard {
    pub fn new(id: i64, amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            id,
            amount,
            owner: owner.into(),
        }
    }
}

/// Body accepted by create and update. Any `id` or `owner` sent by the
/// client is dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CashCardRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}
