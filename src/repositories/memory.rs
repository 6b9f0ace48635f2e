//! In-process repositories, used by tests and local demos.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::agent::{Agent, NewAgent};
use crate::models::citoyen::{Citoyen, NewCitoyen};
use crate::models::demande::{Demande, NewDemande, StatutDemande};
use crate::repositories::agent::AgentRepository;
use crate::repositories::citoyen::{CitoyenRepository, EMAIL_TAKEN};
use crate::repositories::demande::{DemandeFilter, DemandeRepository};

#[derive(Clone, Default)]
pub struct MemoryCitoyenRepository {
    rows: Arc<RwLock<Vec<Citoyen>>>,
}

impl MemoryCitoyenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes an account, leaving its sessions and demandes dangling.
    pub async fn remove(&self, id: Uuid) {
        self.rows.write().await.retain(|c| c.id != id);
    }
}

#[async_trait]
impl CitoyenRepository for MemoryCitoyenRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Citoyen>> {
        Ok(self.rows.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Citoyen>> {
        Ok(self.rows.read().await.iter().find(|c| c.email == email).cloned())
    }

    async fn create(&self, data: NewCitoyen) -> Result<Citoyen> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|c| c.email == data.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }
        let citoyen = Citoyen {
            id: Uuid::new_v4(),
            email: data.email,
            password: data.password_hash,
            nom: data.nom,
            prenom: data.prenom,
            date_naissance: data.date_naissance,
            created_at: Utc::now(),
        };
        rows.push(citoyen.clone());
        Ok(citoyen)
    }
}

#[derive(Clone, Default)]
pub struct MemoryAgentRepository {
    rows: Arc<RwLock<Vec<Agent>>>,
}

impl MemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentRepository for MemoryAgentRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>> {
        Ok(self.rows.read().await.iter().find(|a| a.email == email).cloned())
    }

    async fn create(&self, data: NewAgent) -> Result<Agent> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|a| a.email == data.email) {
            return Err(AppError::Conflict(format!("Agent {} already exists", data.email)));
        }
        let agent = Agent {
            id: Uuid::new_v4(),
            email: data.email,
            password: data.password_hash,
            nom: data.nom,
            prenom: data.prenom,
            role: data.role,
            created_at: Utc::now(),
        };
        rows.push(agent.clone());
        Ok(agent)
    }
}

#[derive(Clone, Default)]
pub struct MemoryDemandeRepository {
    rows: Arc<RwLock<Vec<Demande>>>,
}

impl MemoryDemandeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DemandeRepository for MemoryDemandeRepository {
    async fn create(&self, data: NewDemande) -> Result<Demande> {
        let demande = Demande {
            id: Uuid::new_v4(),
            demande_pour_tier: data.demande_pour_tier,
            type_acte: data.type_acte,
            nom: data.nom,
            prenom: data.prenom,
            date_acte: data.date_acte,
            citoyen_id: data.citoyen_id,
            statut: data.statut,
            date_demande: data.date_demande,
        };
        self.rows.write().await.push(demande.clone());
        Ok(demande)
    }

    async fn find_one(&self, filter: &DemandeFilter) -> Result<Option<Demande>> {
        Ok(self.find_all(filter).await?.into_iter().next())
    }

    async fn find_all(&self, filter: &DemandeFilter) -> Result<Vec<Demande>> {
        let mut found: Vec<Demande> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date_demande.cmp(&a.date_demande));
        Ok(found)
    }

    async fn update_statut(
        &self,
        id: Uuid,
        from: StatutDemande,
        to: StatutDemande,
    ) -> Result<Option<Demande>> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|d| d.id == id && d.statut == from) {
            Some(demande) => {
                demande.statut = to;
                Ok(Some(demande.clone()))
            }
            None => Ok(None),
        }
    }
}
