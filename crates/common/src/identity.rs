//! Caller identity and capability checking.
//!
//! The core does not own authentication; it receives an already-resolved
//! `CurrentUser` from the identity provider at the boundary. Admin-only
//! operations are gated through the single [`CurrentUser::require`] check
//! rather than ad hoc role comparisons at each call site.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserId;

/// Capability role attached to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular storefront customer.
    #[default]
    User,
    /// Administration console operator.
    Admin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The caller could not satisfy a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation requires {required} role")]
pub struct Forbidden {
    /// The role the operation requires.
    pub required: Role,
}

/// An authenticated caller as resolved by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Creates an identity with the `user` role.
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            role: Role::User,
        }
    }

    /// Creates an identity with the `admin` role.
    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    /// Returns true if the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Checks that the caller holds at least the given role.
    ///
    /// Admin satisfies every requirement; a plain user satisfies only
    /// `Role::User`.
    pub fn require(&self, required: Role) -> Result<(), Forbidden> {
        match (required, self.role) {
            (Role::User, _) => Ok(()),
            (Role::Admin, Role::Admin) => Ok(()),
            (Role::Admin, Role::User) => Err(Forbidden { required }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_both_roles() {
        let admin = CurrentUser::admin(UserId::new());
        assert!(admin.require(Role::User).is_ok());
        assert!(admin.require(Role::Admin).is_ok());
        assert!(admin.is_admin());
    }

    #[test]
    fn user_cannot_satisfy_admin() {
        let user = CurrentUser::user(UserId::new());
        assert!(user.require(Role::User).is_ok());
        assert_eq!(
            user.require(Role::Admin),
            Err(Forbidden {
                required: Role::Admin
            })
        );
    }

    #[test]
    fn role_parses_from_str() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
