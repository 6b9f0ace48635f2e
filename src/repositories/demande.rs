use async_trait::async_trait;
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::demande::{Demande, NewDemande, StatutDemande};

/// Selection criteria for demandes. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandeFilter {
    pub id: Option<Uuid>,
    pub citoyen_id: Option<Uuid>,
    /// Excludes demandes in this state.
    pub statut_not: Option<StatutDemande>,
}

impl DemandeFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self { id: Some(id), ..Default::default() }
    }

    pub fn by_citoyen(citoyen_id: Uuid) -> Self {
        Self { citoyen_id: Some(citoyen_id), ..Default::default() }
    }

    pub fn matches(&self, demande: &Demande) -> bool {
        self.id.is_none_or(|id| demande.id == id)
            && self.citoyen_id.is_none_or(|c| demande.citoyen_id == c)
            && self.statut_not.is_none_or(|s| demande.statut != s)
    }
}

/// Persistence of demandes.
#[async_trait]
pub trait DemandeRepository: Send + Sync {
    async fn create(&self, data: NewDemande) -> Result<Demande>;
    async fn find_one(&self, filter: &DemandeFilter) -> Result<Option<Demande>>;
    /// Matching demandes, most recent first.
    async fn find_all(&self, filter: &DemandeFilter) -> Result<Vec<Demande>>;
    /// Sets the statut to `to` only if it is still `from`.
    ///
    /// Returns `None` when no demande `id` is in state `from`.
    async fn update_statut(
        &self,
        id: Uuid,
        from: StatutDemande,
        to: StatutDemande,
    ) -> Result<Option<Demande>>;
}

/// PostgreSQL-backed demandes.
#[derive(Clone)]
pub struct PgDemandeRepository {
    pool: Pool,
}

impl PgDemandeRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

const SELECT_FILTERED: &str = r#"
    SELECT id, demande_pour_tier, type_acte, nom, prenom, date_acte,
           citoyen_id, statut, date_demande
    FROM demandes
    WHERE ($1::uuid IS NULL OR id = $1)
      AND ($2::uuid IS NULL OR citoyen_id = $2)
      AND ($3::statut_demande IS NULL OR statut <> $3)
    ORDER BY date_demande DESC
"#;

#[async_trait]
impl DemandeRepository for PgDemandeRepository {
    async fn create(&self, data: NewDemande) -> Result<Demande> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO demandes (id, demande_pour_tier, type_acte, nom, prenom,
                                      date_acte, citoyen_id, statut, date_demande)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id, demande_pour_tier, type_acte, nom, prenom, date_acte,
                          citoyen_id, statut, date_demande
                "#,
            )
            .await?;
        let row = client
            .query_one(
                &stmt,
                &[
                    &Uuid::new_v4(),
                    &data.demande_pour_tier,
                    &data.type_acte,
                    &data.nom,
                    &data.prenom,
                    &data.date_acte,
                    &data.citoyen_id,
                    &data.statut,
                    &data.date_demande,
                ],
            )
            .await?;
        Demande::try_from(&row)
    }

    async fn find_one(&self, filter: &DemandeFilter) -> Result<Option<Demande>> {
        Ok(self.find_all(filter).await?.into_iter().next())
    }

    async fn find_all(&self, filter: &DemandeFilter) -> Result<Vec<Demande>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_FILTERED).await?;
        let rows = client
            .query(&stmt, &[&filter.id, &filter.citoyen_id, &filter.statut_not])
            .await?;
        rows.iter().map(Demande::try_from).collect()
    }

    async fn update_statut(
        &self,
        id: Uuid,
        from: StatutDemande,
        to: StatutDemande,
    ) -> Result<Option<Demande>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                UPDATE demandes
                SET statut = $3
                WHERE id = $1 AND statut = $2
                RETURNING id, demande_pour_tier, type_acte, nom, prenom, date_acte,
                          citoyen_id, statut, date_demande
                "#,
            )
            .await?;
        let row = client.query_opt(&stmt, &[&id, &from, &to]).await?;
        row.as_ref().map(Demande::try_from).transpose()
    }
}
