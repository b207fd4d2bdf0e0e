pub mod error;
pub mod memory_user_store;
pub mod user_repo;
pub mod user_store;
