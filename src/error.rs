use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::demande::StatutDemande;
use crate::validation::FieldErrors;

/// The message shown to callers for every failure whose details must stay internal.
pub const GENERIC_ERROR_MESSAGE: &str = "Une erreur est survenue";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A connection pool construction error.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Field-keyed validation failures.
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// An authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An authorization error.
    #[error("Authorization failed")]
    Unauthorized,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// The resource already exists or was changed concurrently.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A status change outside the demande lifecycle.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: StatutDemande,
        to: StatutDemande,
    },

    /// An encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A column missing from a database row.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::CreatePool(e) => {
                tracing::error!("Pool creation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::Redis(e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::Validation(fields) => {
                tracing::debug!("Validation error on fields: {:?}", fields.keys());
                (StatusCode::BAD_REQUEST, "Formulaire invalide".to_string())
            }

            AppError::Authentication(msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, msg.clone())
            }

            AppError::Unauthorized => {
                tracing::warn!("Authorization failed");
                (StatusCode::FORBIDDEN, "Accès refusé".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Ressource introuvable".to_string())
            }

            AppError::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }

            AppError::InvalidTransition { from, to } => {
                tracing::warn!("Rejected status transition {} -> {}", from, to);
                (
                    StatusCode::CONFLICT,
                    format!("Transition de statut impossible: {} -> {}", from, to),
                )
            }

            AppError::Encryption(msg) => {
                tracing::error!("Encryption error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::MissingData(column) => {
                tracing::error!("Missing column in row: {}", column);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }
        };

        let errors = match &self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = sonic_rs::to_string(&ErrorBody {
            success: false,
            error: &message,
            errors,
        })
        .unwrap_or_else(|_| {
            format!(r#"{{"success":false,"error":"{}"}}"#, GENERIC_ERROR_MESSAGE)
        });

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response =
            AppError::Internal("relation \"demandes\" does not exist".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(axum::body::to_bytes(response.into_body(), usize::MAX))
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("relation"));
        assert!(!body.contains("demandes"));

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["error"].as_str(), Some(GENERIC_ERROR_MESSAGE));
        assert_eq!(value["success"].as_bool(), Some(false));
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(
            AppError::Validation(FieldErrors::new()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Authentication("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Unauthorized.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidTransition {
                from: StatutDemande::Delivree,
                to: StatutDemande::Payee,
            }
            .into_response()
            .status(),
            StatusCode::CONFLICT
        );
    }
}
