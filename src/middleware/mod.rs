pub mod auth;
pub mod require_role;

pub use auth::basic_auth_middleware;
pub use require_role::require_card_owner;
