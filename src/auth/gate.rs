//! Authorization predicates over the request's identity.
//!
//! Every check fails with the same [`Unauthorized`] value, so a rejected
//! caller cannot tell which check failed or whether a credential was sent.

use thiserror::Error;

use super::Identity;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unauthorized")]
pub struct Unauthorized;

/// A verified identity with a non-empty subject.
pub fn require_authenticated(identity: Option<&Identity>) -> Result<(), Unauthorized> {
    match identity {
        Some(identity) if !identity.subject.is_empty() => Ok(()),
        _ => Err(Unauthorized),
    }
}

pub fn require_admin(identity: Option<&Identity>) -> Result<(), Unauthorized> {
    require_authenticated(identity)?;
    match identity {
        Some(identity) if identity.is_admin => Ok(()),
        _ => Err(Unauthorized),
    }
}

/// An admin, or the user named by `target`.
pub fn require_admin_or_self(identity: Option<&Identity>, target: &str) -> Result<(), Unauthorized> {
    require_authenticated(identity)?;
    match identity {
        Some(identity) if identity.is_admin || identity.subject == target => Ok(()),
        _ => Err(Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(subject: &str, is_admin: bool) -> Identity {
        Identity {
            subject: subject.to_string(),
            is_admin,
        }
    }

    #[test]
    fn authenticated_requires_identity() {
        assert_eq!(require_authenticated(None), Err(Unauthorized));
        assert_eq!(require_authenticated(Some(&user("", false))), Err(Unauthorized));
        assert_eq!(require_authenticated(Some(&user("alice", false))), Ok(()));
    }

    #[test]
    fn admin_requires_flag() {
        assert_eq!(require_admin(None), Err(Unauthorized));
        assert_eq!(require_admin(Some(&user("alice", false))), Err(Unauthorized));
        assert_eq!(require_admin(Some(&user("", true))), Err(Unauthorized));
        assert_eq!(require_admin(Some(&user("root", true))), Ok(()));
    }

    #[test]
    fn admin_or_self() {
        let alice = user("alice", false);
        assert_eq!(require_admin_or_self(Some(&alice), "bob"), Err(Unauthorized));
        assert_eq!(require_admin_or_self(Some(&alice), "alice"), Ok(()));
        assert_eq!(require_admin_or_self(Some(&alice), "Alice"), Err(Unauthorized));
        assert_eq!(require_admin_or_self(Some(&user("root", true)), "bob"), Ok(()));
        assert_eq!(require_admin_or_self(None, "bob"), Err(Unauthorized));
        assert_eq!(require_admin_or_self(Some(&user("", false)), ""), Err(Unauthorized));
    }
}
