use chrono::{NaiveDate, Utc};
use garde::Validate;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::validation::{collect_report, finish, not_blank, parse_date, push_error, FieldErrors};

/// The login form as submitted.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct LoginForm {
    #[serde(rename = "Email", default)]
    #[garde(email)]
    pub email: String,
    #[serde(rename = "Password", default)]
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

/// The registration form as submitted.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct RegisterForm {
    #[serde(rename = "Email", default)]
    #[garde(email)]
    pub email: String,
    #[serde(rename = "Password", default)]
    #[garde(length(min = 8, max = 128), custom(strong_password))]
    pub password: String,
    #[serde(rename = "Nom", default)]
    #[garde(length(max = 100), custom(not_blank))]
    pub nom: String,
    #[serde(rename = "Prenom", default)]
    #[garde(length(max = 100), custom(not_blank))]
    pub prenom: String,
    #[serde(rename = "DateNaissance", default)]
    #[garde(skip)]
    pub date_naissance: String,
}

/// Validated login credentials.
pub struct LoginInput {
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Validated registration data.
pub struct RegisterInput {
    pub email: String,
    pub password: Zeroizing<String>,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: NaiveDate,
}

/// At least one digit and one uppercase letter.
fn strong_password(value: &str, _ctx: &()) -> garde::Result {
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(garde::Error::new("Le mot de passe doit contenir au moins un chiffre"));
    }
    if !value.chars().any(|c| c.is_uppercase()) {
        return Err(garde::Error::new("Le mot de passe doit contenir au moins une majuscule"));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl LoginForm {
    /// Validates the form.
    pub fn parse(mut self) -> Result<LoginInput> {
        self.email = normalize_email(&self.email);
        let mut errors = FieldErrors::new();
        if let Err(report) = self.validate() {
            collect_report(&mut errors, &report);
        }
        finish(errors)?;

        Ok(LoginInput {
            email: self.email,
            password: Zeroizing::new(self.password),
        })
    }
}

impl RegisterForm {
    /// Validates the form.
    pub fn parse(mut self) -> Result<RegisterInput> {
        self.email = normalize_email(&self.email);
        let mut errors = FieldErrors::new();
        if let Err(report) = self.validate() {
            collect_report(&mut errors, &report);
        }

        let date_naissance = match parse_date(&self.date_naissance) {
            Some(date) if date > Utc::now().date_naive() => {
                push_error(&mut errors, "DateNaissance", "La date de naissance est dans le futur");
                None
            }
            Some(date) => Some(date),
            None => {
                push_error(&mut errors, "DateNaissance", "Date attendue au format AAAA-MM-JJ");
                None
            }
        };

        finish(errors)?;

        let Some(date_naissance) = date_naissance else {
            return Err(crate::error::AppError::Internal(
                "date_naissance missing after validation".to_string(),
            ));
        };

        Ok(RegisterInput {
            email: self.email,
            password: Zeroizing::new(self.password),
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            date_naissance,
        })
    }
}
