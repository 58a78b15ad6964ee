// Handlers. Everything under `cashcards` sits behind Basic authentication
// and the card-owner role check; `health` is public.
pub mod cashcards;
pub mod extract;
pub mod health;

pub use extract::JsonBody;
pub use health::health;
