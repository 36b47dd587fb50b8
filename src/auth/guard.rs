//! Ownership/role authorization guard.
//!
//! One pair of decision functions shared by every owned resource type
//! instead of a copy per entity. Guards are pure: they look only at the
//! actor and the resource, and a denial is a typed result the caller can
//! `?` on rather than an exception thrown for control flow.

use crate::account::models::Account;
use crate::error::{ApiError, ErrorCode};

/// Resource with an owning account.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Resource with a public-visibility flag.
pub trait Visible {
    fn is_public(&self) -> bool;
}

/// Admin-or-owner rule for mutation and deletion.
///
/// An absent actor denies with `UNAUTHENTICATED` (401); a resolved actor
/// that is neither admin nor owner denies with `FORBIDDEN` (403).
pub fn can_modify_or_delete(
    actor: Option<&Account>,
    resource: &impl Owned,
) -> Result<(), ApiError> {
    let actor = actor.ok_or_else(|| ApiError::from_code(ErrorCode::Unauthenticated))?;
    if actor.is_admin || actor.id == resource.owner_id() {
        return Ok(());
    }
    Err(ApiError::new(
        ErrorCode::Forbidden,
        "only the owner may modify this resource",
    ))
}

/// Read rule: publicly visible resources need no actor; private ones fall
/// back to the admin-or-owner rule with the same 401/403 distinction.
pub fn can_read<R: Owned + Visible>(actor: Option<&Account>, resource: &R) -> Result<(), ApiError> {
    if resource.is_public() {
        return Ok(());
    }
    can_modify_or_delete(actor, resource).map_err(|err| match err.code {
        ErrorCode::Forbidden => ApiError::new(ErrorCode::Forbidden, "this resource is private"),
        _ => err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resource {
        owner: i64,
        public: bool,
    }

    impl Owned for Resource {
        fn owner_id(&self) -> i64 {
            self.owner
        }
    }

    impl Visible for Resource {
        fn is_public(&self) -> bool {
            self.public
        }
    }

    fn admin() -> Account {
        Account::sample(1, "admin", "Administrator", true)
    }

    fn owner() -> Account {
        Account::sample(2, "user1", "Aria", false)
    }

    fn stranger() -> Account {
        Account::sample(3, "user2", "Basil", false)
    }

    fn resource(public: bool) -> Resource {
        Resource { owner: 2, public }
    }

    #[test]
    fn test_modify_admin_always_allowed() {
        assert!(can_modify_or_delete(Some(&admin()), &resource(true)).is_ok());
        assert!(can_modify_or_delete(Some(&admin()), &resource(false)).is_ok());
    }

    #[test]
    fn test_modify_owner_allowed() {
        assert!(can_modify_or_delete(Some(&owner()), &resource(false)).is_ok());
    }

    #[test]
    fn test_modify_stranger_forbidden() {
        let err = can_modify_or_delete(Some(&stranger()), &resource(true)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_modify_absent_actor_unauthenticated() {
        // Distinct from Forbidden: the caller maps these to 401 vs 403
        let err = can_modify_or_delete(None, &resource(true)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_read_public_needs_no_actor() {
        assert!(can_read(None, &resource(true)).is_ok());
        assert!(can_read(Some(&stranger()), &resource(true)).is_ok());
    }

    #[test]
    fn test_read_private_owner_and_admin_only() {
        assert!(can_read(Some(&owner()), &resource(false)).is_ok());
        assert!(can_read(Some(&admin()), &resource(false)).is_ok());

        let err = can_read(Some(&stranger()), &resource(false)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = can_read(None, &resource(false)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }
}
