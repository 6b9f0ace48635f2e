use std::fmt;

use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "role_utilisateur")]
pub enum Role {
    /// A citizen account; the default for every session.
    #[default]
    Citoyen,
    /// Full access to the admin surface.
    Administrateur,
    /// A civil-status clerk working on demandes.
    Agent,
}

impl Role {
    /// Whether this role may use the admin surface.
    pub fn is_administrative(self) -> bool {
        matches!(self, Role::Administrateur | Role::Agent)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Citoyen => "Citoyen",
            Role::Administrateur => "Administrateur",
            Role::Agent => "Agent",
        };
        f.write_str(name)
    }
}

/// Represents a user session.
///
/// The record travels inside the sealed `session` cookie; the server keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Random handle used to revoke this token before it expires.
    pub session_id: Uuid,
    /// The ID of the citizen or agent this session belongs to.
    pub user_id: Uuid,
    /// The role granted by this session.
    pub role: Role,
    /// The timestamp when the session was created.
    pub issued_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Builds a record valid for `duration` from `now`.
    pub fn issue(user_id: Uuid, role: Role, now: DateTime<Utc>, duration: chrono::Duration) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            role,
            issued_at: now,
            expires_at: now + duration,
        }
    }

    /// Whether the session is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
