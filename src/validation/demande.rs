use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::demande::{DemandePourTier, TypeActe};
use crate::validation::{finish, parse_date, push_error, FieldErrors};

const MAX_NAME_LEN: usize = 100;

/// The demande form as submitted. Every field arrives as text.
#[derive(Deserialize, Debug, Default)]
pub struct DemandeForm {
    #[serde(rename = "DemandePourTier", default)]
    pub demande_pour_tier: String,
    #[serde(rename = "TypeActe", default)]
    pub type_acte: String,
    #[serde(rename = "Nom", default)]
    pub nom: Option<String>,
    #[serde(rename = "Prenom", default)]
    pub prenom: Option<String>,
    #[serde(rename = "DateActe", default)]
    pub date_acte: Option<String>,
}

/// Who the demande is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beneficiaire {
    /// The requesting citizen; identity fields come from the account.
    Moi,
    /// A third party described by the form.
    Tiers {
        nom: String,
        prenom: String,
        date_acte: NaiveDate,
    },
}

/// A validated demande form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandeInput {
    pub type_acte: TypeActe,
    pub beneficiaire: Beneficiaire,
}

impl DemandeInput {
    pub fn demande_pour_tier(&self) -> DemandePourTier {
        match self.beneficiaire {
            Beneficiaire::Moi => DemandePourTier::Moi,
            Beneficiaire::Tiers { .. } => DemandePourTier::Tiers,
        }
    }
}

fn parse_pour_tier(value: &str) -> Option<DemandePourTier> {
    match value.trim() {
        "Moi" => Some(DemandePourTier::Moi),
        "Tiers" => Some(DemandePourTier::Tiers),
        _ => None,
    }
}

fn parse_type_acte(value: &str) -> Option<TypeActe> {
    match value.trim() {
        "Naissance" => Some(TypeActe::Naissance),
        "Mariage" => Some(TypeActe::Mariage),
        "Deces" => Some(TypeActe::Deces),
        _ => None,
    }
}

fn required_name(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        push_error(errors, field, "Ce champ est obligatoire");
        return None;
    }
    if value.chars().count() > MAX_NAME_LEN {
        push_error(errors, field, format!("{} caractères maximum", MAX_NAME_LEN));
        return None;
    }
    Some(value.to_string())
}

impl DemandeForm {
    /// Validates the form.
    ///
    /// For `Moi` the identity fields are ignored; for `Tiers` they are required.
    pub fn parse(self) -> Result<DemandeInput> {
        let mut errors = FieldErrors::new();

        let pour_tier = parse_pour_tier(&self.demande_pour_tier);
        if pour_tier.is_none() {
            push_error(&mut errors, "DemandePourTier", "Valeur attendue: Moi ou Tiers");
        }

        let type_acte = parse_type_acte(&self.type_acte);
        if type_acte.is_none() {
            push_error(&mut errors, "TypeActe", "Valeur attendue: Naissance, Mariage ou Deces");
        }

        let beneficiaire = match pour_tier {
            Some(DemandePourTier::Moi) => Some(Beneficiaire::Moi),
            Some(DemandePourTier::Tiers) => {
                let nom = required_name(&mut errors, "Nom", self.nom.as_deref());
                let prenom = required_name(&mut errors, "Prenom", self.prenom.as_deref());
                let date_acte = match self.date_acte.as_deref().map(parse_date) {
                    Some(Some(date)) => Some(date),
                    Some(None) => {
                        push_error(&mut errors, "DateActe", "Date attendue au format AAAA-MM-JJ");
                        None
                    }
                    None => {
                        push_error(&mut errors, "DateActe", "Ce champ est obligatoire");
                        None
                    }
                };
                match (nom, prenom, date_acte) {
                    (Some(nom), Some(prenom), Some(date_acte)) => Some(Beneficiaire::Tiers {
                        nom,
                        prenom,
                        date_acte,
                    }),
                    _ => None,
                }
            }
            None => None,
        };

        finish(errors)?;

        match (type_acte, beneficiaire) {
            (Some(type_acte), Some(beneficiaire)) => Ok(DemandeInput {
                type_acte,
                beneficiaire,
            }),
            _ => Err(AppError::Internal(
                "demande form accepted with missing fields".to_string(),
            )),
        }
    }
}
