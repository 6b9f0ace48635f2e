use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::agent::{Agent, NewAgent};

/// Access to administrative accounts.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>>;
    async fn create(&self, data: NewAgent) -> Result<Agent>;
}

/// PostgreSQL-backed administrative accounts.
#[derive(Clone)]
pub struct PgAgentRepository {
    pool: Pool,
}

impl PgAgentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for PgAgentRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                SELECT id, email, password, nom, prenom, role, created_at
                FROM agents
                WHERE email = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&stmt, &[&email]).await?;
        row.as_ref().map(Agent::try_from).transpose()
    }

    async fn create(&self, data: NewAgent) -> Result<Agent> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO agents (id, email, password, nom, prenom, role)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, email, password, nom, prenom, role, created_at
                "#,
            )
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
                    &data.role,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict(format!("Agent {} already exists", data.email))
                } else {
                    AppError::Database(e)
                }
            })?;
        Agent::try_from(&row)
    }
}
