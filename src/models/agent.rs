use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::Role;

/// Represents an administrative account (administrator or agent).
#[derive(Clone, Debug)]
pub struct Agent {
    /// The unique identifier for the agent.
    pub id: Uuid,
    /// The agent's email address.
    pub email: String,
    /// The agent's hashed password.
    pub password: String,
    /// The agent's family name.
    pub nom: String,
    /// The agent's first name.
    pub prenom: String,
    /// Either `Administrateur` or `Agent`.
    pub role: Role,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
}

/// The data needed to create an administrative account.
#[derive(Clone, Debug)]
pub struct NewAgent {
    pub email: String,
    pub password_hash: String,
    pub nom: String,
    pub prenom: String,
    pub role: Role,
}

impl TryFrom<&Row> for Agent {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
            password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
            nom: row.try_get("nom").map_err(|_| AppError::MissingData("nom".to_string()))?,
            prenom: row.try_get("prenom").map_err(|_| AppError::MissingData("prenom".to_string()))?,
            role: row.try_get("role").map_err(|_| AppError::MissingData("role".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        })
    }
}
