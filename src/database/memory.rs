use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::CashCard;
use super::page::{Page, PageRequest};
use super::store::CardStore;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, CashCard>,
    next_id: i64,
}

/// Keyed in-memory table used when no `DATABASE_URL` is configured.
///
/// Writers take the lock exclusively, so concurrent updates to the same card
/// are serialized.
#[derive(Debug)]
pub struct MemoryCardStore {
    table: RwLock<Table>,
}

impl Default for MemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Store preloaded with `cards`. New ids continue after the highest seeded id.
    pub fn with_cards(cards: impl IntoIterator<Item = CashCard>) -> Self {
        let rows: BTreeMap<i64, CashCard> = cards.into_iter().map(|c| (c.id, c)).collect();
        let next_id = rows.keys().next_back().map_or(1, |max| max + 1);
        Self {
            table: RwLock::new(Table { rows, next_id }),
        }
    }

    fn paginate<'a>(
        cards: impl Iterator<Item = &'a CashCard>,
        page: &PageRequest,
    ) -> Page<CashCard> {
        let mut matching: Vec<CashCard> = cards.cloned().collect();
        matching.sort_by(|a, b| page.sort.compare(a, b));

        let total_elements = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .collect();

        Page {
            content,
            number: page.page,
            size: page.size,
            total_elements,
        }
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn create(&self, amount: Decimal, owner: &str) -> Result<CashCard, DatabaseError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let card = CashCard::new(id, amount, owner);
        table.rows.insert(id, card.clone());
        Ok(card)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CashCard>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<CashCard>, DatabaseError> {
        let table = self.table.read().await;
        Ok(Self::paginate(table.rows.values(), page))
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
    ) -> Result<Option<CashCard>, DatabaseError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|c| c.owner == owner).cloned())
    }

    async fn find_by_owner(
        &self,
        owner: &str,
        page: &PageRequest,
    ) -> Result<Page<CashCard>, DatabaseError> {
        let table = self.table.read().await;
        Ok(Self::paginate(
            table.rows.values().filter(|c| c.owner == owner),
            page,
        ))
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, DatabaseError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).is_some_and(|c| c.owner == owner))
    }

    async fn update(&self, id: i64, amount: Decimal, owner: &str) -> Result<bool, DatabaseError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(card) if card.owner == owner => {
                card.amount = amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}
