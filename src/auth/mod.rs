//! Authentication and authorization core.
//!
//! A dual-credential scheme: a long-lived opaque identity key plus a
//! short-lived signed access token, combined into one bearer value.
//!
//! ## Components
//! - `claims`: stateless HS256 sign/verify of the access-token claims
//! - `credential`: combined-credential parsing, issuance and cookies
//! - `gate`: per-request authentication middleware with transparent refresh
//! - `guard`: ownership/role decision functions shared by owned resources

pub mod claims;
pub mod credential;
pub mod gate;
pub mod guard;

// Re-export for convenience
pub use claims::{AccessClaims, sign, verify};
pub use credential::{
    ACCESS_TOKEN_COOKIE, API_KEY_COOKIE, BearerCredential, CredentialIssuer, IssuedCredential,
};
pub use gate::{ResolvedActor, authentication_gate};
pub use guard::{Owned, Visible, can_modify_or_delete, can_read};
