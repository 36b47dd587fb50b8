//! Account management: model, storage, registration/login, member API.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use models::{Account, AccountDto, NewAccount};
pub use repository::{AccountRepository, MemoryAccountRepository, PgAccountRepository};
pub use service::AccountService;
