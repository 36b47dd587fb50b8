//! inkpress — content service backend.
//!
//! Posts, comments and accounts behind a dual-credential authentication
//! pipeline: a long-lived opaque identity key paired with a short-lived
//! signed access token, refreshed transparently on every request that
//! arrives with a stale token.
//!
//! # Modules
//!
//! - [`auth`] - credential scheme, authentication gate, ownership guards
//! - [`account`] - accounts: model, storage, registration/login
//! - [`post`] - posts and comments
//! - [`gateway`] - axum router, shared state, response envelope
//! - [`config`], [`logging`], [`db`], [`error`] - service plumbing

pub mod account;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod post;

// Convenient re-exports at crate root
pub use error::{ApiError, ErrorCode};
pub use gateway::state::AppState;
