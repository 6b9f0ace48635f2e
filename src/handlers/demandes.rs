use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::demande::{Demande, DemandeDetail, StatutDemande},
    models::session::SessionRecord,
    state::AppState,
    validation::demande::DemandeForm,
};

#[derive(Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    #[serde(rename = "ID_Demande")]
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct DemandeListResponse {
    pub success: bool,
    #[serde(rename = "Demandes")]
    pub demandes: Vec<Demande>,
}

#[derive(Serialize)]
pub struct DemandeResponse<T> {
    pub success: bool,
    #[serde(rename = "Demande")]
    pub demande: T,
}

/// The request payload for a statut change.
#[derive(Deserialize, Debug)]
pub struct UpdateStatutRequest {
    #[serde(rename = "Statut")]
    pub statut: StatutDemande,
}

/// Identifiers that are not UUIDs cannot name a demande.
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// Files a demande for the logged-in citizen.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRecord>,
    Json(payload): Json<DemandeForm>,
) -> Result<Response> {
    let id = state.demandes.create(&session, payload).await?;

    let response = CreatedResponse { success: true, id };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Lists the demandes of the logged-in citizen.
#[axum::debug_handler]
pub async fn mine(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRecord>,
) -> Result<Response> {
    let demandes = state.demandes.list_for_current_citizen(Some(&session)).await?;

    let response = DemandeListResponse { success: true, demandes };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// One demande with its owner, for the owner or staff.
#[axum::debug_handler]
pub async fn get_one(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRecord>,
    Path(id): Path<String>,
) -> Result<Response> {
    let detail: DemandeDetail = state.demandes.get_for_viewer(parse_id(&id)?, &session).await?;

    let response = DemandeResponse { success: true, demande: detail };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Lists every paid demande, for the back office.
#[axum::debug_handler]
pub async fn list_admin(State(state): State<AppState>) -> Result<Response> {
    let demandes = state.demandes.list_public().await?;

    let response = DemandeListResponse { success: true, demandes };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Moves a demande along its lifecycle.
#[axum::debug_handler]
pub async fn update_statut(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRecord>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatutRequest>,
) -> Result<Response> {
    tracing::info!("📋 {} sets demande {} to {}", session.user_id, id, payload.statut);

    let demande = state.demandes.update_status(parse_id(&id)?, payload.statut).await?;

    let response = DemandeResponse { success: true, demande };
    Ok((StatusCode::OK, Json(response)).into_response())
}
