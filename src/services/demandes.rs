use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::citoyen::CitoyenProfile;
use crate::models::demande::{Demande, DemandeDetail, NewDemande, StatutDemande};
use crate::models::session::{Role, SessionRecord};
use crate::repositories::citoyen::CitoyenRepository;
use crate::repositories::demande::{DemandeFilter, DemandeRepository};
use crate::validation::demande::{Beneficiaire, DemandeForm};

/// Midnight UTC on `date`.
fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Only citizens own demandes.
fn require_citoyen(session: &SessionRecord) -> Result<()> {
    if session.role != Role::Citoyen {
        tracing::warn!("❌ {} ({}) is not a citizen session", session.user_id, session.role);
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// The demande lifecycle: creation, reads and status transitions.
#[derive(Clone)]
pub struct DemandeService {
    citoyens: Arc<dyn CitoyenRepository>,
    demandes: Arc<dyn DemandeRepository>,
}

impl DemandeService {
    /// Creates a new `DemandeService`.
    pub fn new(citoyens: Arc<dyn CitoyenRepository>, demandes: Arc<dyn DemandeRepository>) -> Self {
        Self { citoyens, demandes }
    }

    /// Files a demande for the citizen of `session`.
    ///
    /// For `Moi`, the identity fields are copied from the citizen's account; for `Tiers`
    /// they come from the form and the act date is taken at midnight UTC. Every new
    /// demande starts awaiting payment.
    ///
    /// # Returns
    ///
    /// The ID of the new demande.
    pub async fn create(&self, session: &SessionRecord, form: DemandeForm) -> Result<Uuid> {
        require_citoyen(session)?;
        let input = form.parse()?;
        let pour_tier = input.demande_pour_tier();

        let citoyen = self
            .citoyens
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Session {} refers to missing citizen {}",
                    session.session_id, session.user_id
                ))
            })?;

        let (nom, prenom, date_acte) = match input.beneficiaire {
            Beneficiaire::Moi => (
                citoyen.nom.clone(),
                citoyen.prenom.clone(),
                start_of_day(citoyen.date_naissance),
            ),
            Beneficiaire::Tiers { nom, prenom, date_acte } => (nom, prenom, start_of_day(date_acte)),
        };

        let demande = self
            .demandes
            .create(NewDemande {
                demande_pour_tier: pour_tier,
                type_acte: input.type_acte,
                nom,
                prenom,
                date_acte,
                citoyen_id: citoyen.id,
                statut: StatutDemande::INITIAL,
                date_demande: Utc::now(),
            })
            .await?;

        tracing::info!("✅ Demande {} created for citizen {}", demande.id, citoyen.id);
        Ok(demande.id)
    }

    /// A demande with its owner.
    pub async fn get_one(&self, id: Uuid) -> Result<Option<DemandeDetail>> {
        let Some(demande) = self.demandes.find_one(&DemandeFilter::by_id(id)).await? else {
            return Ok(None);
        };

        let citoyen = self
            .citoyens
            .find_by_id(demande.citoyen_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Demande {} refers to missing citizen {}",
                    demande.id, demande.citoyen_id
                ))
            })?;

        Ok(Some(DemandeDetail {
            demande,
            citoyen: CitoyenProfile::from(&citoyen),
        }))
    }

    /// A demande as seen by `session`: its owner or an administrative role.
    ///
    /// Demandes the viewer may not read are reported as not found.
    pub async fn get_for_viewer(&self, id: Uuid, session: &SessionRecord) -> Result<DemandeDetail> {
        let detail = self.get_one(id).await?.ok_or(AppError::NotFound)?;

        let is_owner = session.role == Role::Citoyen && detail.demande.citoyen_id == session.user_id;
        if !is_owner && !session.role.is_administrative() {
            tracing::warn!("❌ {} tried to read demande {}", session.user_id, id);
            return Err(AppError::NotFound);
        }

        Ok(detail)
    }

    /// Every demande whose payment has cleared, for the admin listings.
    pub async fn list_public(&self) -> Result<Vec<Demande>> {
        self.demandes
            .find_all(&DemandeFilter {
                statut_not: Some(StatutDemande::INITIAL),
                ..Default::default()
            })
            .await
    }

    /// Every demande of the session's citizen, any statut.
    pub async fn list_for_current_citizen(&self, session: Option<&SessionRecord>) -> Result<Vec<Demande>> {
        let session = session.ok_or_else(|| {
            AppError::Authentication(crate::error::GENERIC_ERROR_MESSAGE.to_string())
        })?;
        require_citoyen(session)?;
        self.demandes
            .find_all(&DemandeFilter::by_citoyen(session.user_id))
            .await
    }

    /// Moves a demande to `statut`.
    ///
    /// Only forward transitions from the current statut are accepted. The write only
    /// applies if the statut did not change since it was read.
    pub async fn update_status(&self, id: Uuid, statut: StatutDemande) -> Result<Demande> {
        let current = self
            .demandes
            .find_one(&DemandeFilter::by_id(id))
            .await?
            .ok_or(AppError::NotFound)?;

        if !current.statut.can_transition_to(statut) {
            return Err(AppError::InvalidTransition {
                from: current.statut,
                to: statut,
            });
        }

        let updated = self
            .demandes
            .update_statut(id, current.statut, statut)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("La demande a été modifiée entre-temps".to_string())
            })?;

        tracing::info!("✅ Demande {}: {} -> {}", id, current.statut, updated.statut);
        Ok(updated)
    }
}
