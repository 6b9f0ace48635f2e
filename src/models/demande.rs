use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize, Serializer};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::citoyen::CitoyenProfile;

/// Whom a demande is filed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "demande_pour_tier")]
pub enum DemandePourTier {
    /// The requesting citizen.
    Moi,
    /// A third party.
    Tiers,
}

/// The civil-status act being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "type_acte")]
pub enum TypeActe {
    Naissance,
    Mariage,
    Deces,
}

/// The lifecycle of a demande.
///
/// The main line runs `SoumiseEnAttenteDePaiement → Payee → EnCoursDeTraitement → Delivree`.
/// `Rejetee` can end any demande that is not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "statut_demande")]
pub enum StatutDemande {
    SoumiseEnAttenteDePaiement,
    Payee,
    EnCoursDeTraitement,
    Delivree,
    Rejetee,
}

const MAIN_LINE: [StatutDemande; 4] = [
    StatutDemande::SoumiseEnAttenteDePaiement,
    StatutDemande::Payee,
    StatutDemande::EnCoursDeTraitement,
    StatutDemande::Delivree,
];

impl StatutDemande {
    /// The state every demande starts in.
    pub const INITIAL: StatutDemande = StatutDemande::SoumiseEnAttenteDePaiement;

    /// Every state, in lifecycle order.
    pub const ALL: [StatutDemande; 5] = [
        StatutDemande::SoumiseEnAttenteDePaiement,
        StatutDemande::Payee,
        StatutDemande::EnCoursDeTraitement,
        StatutDemande::Delivree,
        StatutDemande::Rejetee,
    ];

    fn rank(self) -> Option<usize> {
        MAIN_LINE.iter().position(|s| *s == self)
    }

    /// Whether no transition leaves this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, StatutDemande::Delivree | StatutDemande::Rejetee)
    }

    /// The states reachable from `self` in one transition.
    pub fn allowed_next(self) -> Vec<StatutDemande> {
        if self.is_terminal() {
            return Vec::new();
        }

        let mut next = match self.rank() {
            Some(rank) => MAIN_LINE[rank + 1..].to_vec(),
            None => Vec::new(),
        };
        next.push(StatutDemande::Rejetee);
        next
    }

    pub fn can_transition_to(self, next: StatutDemande) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl fmt::Display for StatutDemande {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatutDemande::SoumiseEnAttenteDePaiement => "SoumiseEnAttenteDePaiement",
            StatutDemande::Payee => "Payee",
            StatutDemande::EnCoursDeTraitement => "EnCoursDeTraitement",
            StatutDemande::Delivree => "Delivree",
            StatutDemande::Rejetee => "Rejetee",
        };
        f.write_str(name)
    }
}

/// Serializes timestamps as `1990-05-01T00:00:00.000Z`.
fn millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Represents a citizen's request for a civil-status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Demande {
    #[serde(rename = "ID_Demande")]
    pub id: Uuid,
    pub demande_pour_tier: DemandePourTier,
    pub type_acte: TypeActe,
    pub nom: String,
    pub prenom: String,
    #[serde(serialize_with = "millis")]
    pub date_acte: DateTime<Utc>,
    #[serde(rename = "ID_Citoyen")]
    pub citoyen_id: Uuid,
    pub statut: StatutDemande,
    #[serde(serialize_with = "millis")]
    pub date_demande: DateTime<Utc>,
}

/// The fields of a demande about to be persisted.
#[derive(Debug, Clone)]
pub struct NewDemande {
    pub demande_pour_tier: DemandePourTier,
    pub type_acte: TypeActe,
    pub nom: String,
    pub prenom: String,
    pub date_acte: DateTime<Utc>,
    pub citoyen_id: Uuid,
    pub statut: StatutDemande,
    pub date_demande: DateTime<Utc>,
}

/// A demande together with its owner.
#[derive(Debug, Clone, Serialize)]
pub struct DemandeDetail {
    #[serde(flatten)]
    pub demande: Demande,
    #[serde(rename = "Citoyen")]
    pub citoyen: CitoyenProfile,
}

impl TryFrom<&Row> for Demande {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            demande_pour_tier: row.try_get("demande_pour_tier").map_err(|_| AppError::MissingData("demande_pour_tier".to_string()))?,
            type_acte: row.try_get("type_acte").map_err(|_| AppError::MissingData("type_acte".to_string()))?,
            nom: row.try_get("nom").map_err(|_| AppError::MissingData("nom".to_string()))?,
            prenom: row.try_get("prenom").map_err(|_| AppError::MissingData("prenom".to_string()))?,
            date_acte: row.try_get("date_acte").map_err(|_| AppError::MissingData("date_acte".to_string()))?,
            citoyen_id: row.try_get("citoyen_id").map_err(|_| AppError::MissingData("citoyen_id".to_string()))?,
            statut: row.try_get("statut").map_err(|_| AppError::MissingData("statut".to_string()))?,
            date_demande: row.try_get("date_demande").map_err(|_| AppError::MissingData("date_demande".to_string()))?,
        })
    }
}
