use rust_decimal::Decimal;

use super::models::CashCard;

/// Demo cards seeded in development: three for `sarah1`, one for `kumar2`.
pub fn demo_cards() -> Vec<CashCard> {
    vec![
        CashCard::new(99, Decimal::new(12345, 2), "sarah1"),
        CashCard::new(100, Decimal::new(100, 2), "sarah1"),
        CashCard::new(101, Decimal::new(15000, 2), "sarah1"),
        CashCard::new(102, Decimal::new(20000, 2), "kumar2"),
    ]
}
