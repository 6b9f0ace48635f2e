use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Represents a citizen account.
#[derive(Clone, Debug)]
pub struct Citoyen {
    /// The unique identifier for the citizen.
    pub id: Uuid,
    /// The citizen's email address, unique across accounts.
    pub email: String,
    /// The citizen's hashed password (Argon2 PHC string).
    pub password: String,
    /// The citizen's family name.
    pub nom: String,
    /// The citizen's first name.
    pub prenom: String,
    /// The citizen's date of birth.
    pub date_naissance: NaiveDate,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
}

/// The data needed to create a citizen account.
#[derive(Clone, Debug)]
pub struct NewCitoyen {
    pub email: String,
    pub password_hash: String,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: NaiveDate,
}

/// A citizen as exposed to API callers, without credentials.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CitoyenProfile {
    #[serde(rename = "ID_Citoyen")]
    pub id: Uuid,
    pub email: String,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: NaiveDate,
}

impl From<&Citoyen> for CitoyenProfile {
    fn from(c: &Citoyen) -> Self {
        Self {
            id: c.id,
            email: c.email.clone(),
            nom: c.nom.clone(),
            prenom: c.prenom.clone(),
            date_naissance: c.date_naissance,
        }
    }
}

impl TryFrom<&Row> for Citoyen {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
            password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
            nom: row.try_get("nom").map_err(|_| AppError::MissingData("nom".to_string()))?,
            prenom: row.try_get("prenom").map_err(|_| AppError::MissingData("prenom".to_string()))?,
            date_naissance: row.try_get("date_naissance").map_err(|_| AppError::MissingData("date_naissance".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        })
    }
}
