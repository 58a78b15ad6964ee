pub mod fixtures;
pub mod manager;
pub mod memory;
pub mod models;
pub mod page;
pub mod postgres;
pub mod store;

pub use manager::DatabaseError;
pub use memory::MemoryCardStore;
pub use models::CashCard;
pub use page::{Page, PageError, PageRequest, SortDirection, SortField, SortOrder};
pub use postgres::PgCardStore;
pub use store::CardStore;
