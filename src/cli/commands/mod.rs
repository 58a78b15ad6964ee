pub mod serve;
pub mod users;
