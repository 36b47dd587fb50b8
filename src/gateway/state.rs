//! Shared application state.

use crate::account::service::AccountService;
use crate::auth::credential::CredentialIssuer;
use crate::post::service::PostService;

/// State shared by every handler and the authentication gate.
///
/// Everything here is either immutable configuration or a service over a
/// thread-safe store, so requests need no locking of their own.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub issuer: CredentialIssuer,
}

impl AppState {
    pub fn new(accounts: AccountService, posts: PostService, issuer: CredentialIssuer) -> Self {
        Self {
            accounts,
            posts,
            issuer,
        }
    }
}
