/*
 * Responsibility
 * - Principal (identity resolved from a token subject) and its Role
 * - Authorities are derived, never stored: "ROLE_" + role
 */
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AUTHORITY_PREFIX: &str = "ROLE_";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    // assigned on registration
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user as known to the store.
///
/// `email` is the identifier: it is the token subject and the login name.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl Principal {
    pub fn identifier(&self) -> &str {
        &self.email
    }

    /// Capability strings checked by the authorization policy.
    pub fn authorities(&self) -> BTreeSet<String> {
        // single-role model; additional grants would be merged here
        BTreeSet::from([self.role.authority()])
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Input to `UserStore::create`. The password is already hashed.
#[derive(Clone)]
pub struct NewPrincipal {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
