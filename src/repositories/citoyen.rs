use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::citoyen::{Citoyen, NewCitoyen};

/// The message returned when an email is already registered.
pub const EMAIL_TAKEN: &str = "Cet email est déjà utilisé";

/// Access to citizen accounts.
#[async_trait]
pub trait CitoyenRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Citoyen>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Citoyen>>;
    /// Creates an account; fails with [`AppError::Conflict`] when the email is taken.
    async fn create(&self, data: NewCitoyen) -> Result<Citoyen>;
}

/// PostgreSQL-backed citizen accounts.
#[derive(Clone)]
pub struct PgCitoyenRepository {
    pool: Pool,
}

impl PgCitoyenRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, email, password, nom, prenom, date_naissance, created_at";

#[async_trait]
impl CitoyenRepository for PgCitoyenRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Citoyen>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(&format!("SELECT {} FROM citoyens WHERE id = $1", COLUMNS))
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        row.as_ref().map(Citoyen::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Citoyen>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(&format!("SELECT {} FROM citoyens WHERE email = $1", COLUMNS))
            .await?;
        let row = client.query_opt(&stmt, &[&email]).await?;
        row.as_ref().map(Citoyen::try_from).transpose()
    }

    async fn create(&self, data: NewCitoyen) -> Result<Citoyen> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(&format!(
                r#"
                INSERT INTO citoyens (id, email, password, nom, prenom, date_naissance)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                COLUMNS
            ))
            .await?;
        let row = client
            .query_one(
                &stmt,
                &[
                    &Uuid::new_v4(),
                    &data.email,
                    &data.password_hash,
                    &data.nom,
                    &data.prenom,
                    &data.date_naissance,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict(EMAIL_TAKEN.to_string())
                } else {
                    AppError::Database(e)
                }
            })?;
        Citoyen::try_from(&row)
    }
}
