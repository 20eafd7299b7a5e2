//! Resolved caller identity.
//!
//! Authentication happens in an upstream collaborator; the core only
//! consumes the `{user_id, role}` pair it resolved.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to a resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular player.
    Player,
    /// An operator with access to housekeeping queries.
    Admin,
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Self::Player),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// The resolved identity every mutating operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The authenticated user.
    pub user_id: Uuid,
    /// The user's role.
    pub role: Role,
}

impl Identity {
    /// Creates a player identity.
    #[must_use]
    pub fn player(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Player,
        }
    }

    /// Creates an admin identity.
    #[must_use]
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }
}
