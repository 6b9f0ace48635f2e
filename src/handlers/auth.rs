use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    error::Result,
    models::{citoyen::CitoyenProfile, session::SessionRecord},
    state::AppState,
    validation::auth::{LoginForm, RegisterForm},
};

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// The response payload of `GET /api/auth/me`.
#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    #[serde(rename = "Citoyen")]
    pub citoyen: Option<CitoyenProfile>,
}

/// Handles citizen registration. The new citizen is logged in right away.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterForm>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt: {}", payload.email);

    let citoyen = state.auth.register(payload).await?;
    state.sessions.create_session(&cookies, citoyen.id, None)?;

    let response = AuthResponse {
        success: true,
        message: "Inscription réussie. Bienvenue !".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles citizen login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginForm>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {}", payload.email);

    let citoyen = state.auth.authenticate(payload).await?;
    state.sessions.create_session(&cookies, citoyen.id, None)?;

    let response = AuthResponse {
        success: true,
        message: "Connexion réussie".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles agent and administrator login.
#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginForm>,
) -> Result<Response> {
    tracing::info!("🔐 Admin login attempt: {}", payload.email);

    let agent = state.auth.authenticate_agent(payload).await?;
    state.sessions.create_session(&cookies, agent.id, Some(agent.role))?;

    let response = AuthResponse {
        success: true,
        message: "Connexion réussie".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles logout. Succeeds whether or not a session was present.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    state.sessions.delete_session(&cookies).await;

    let response = AuthResponse {
        success: true,
        message: "Déconnexion réussie".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// The citizen behind the current session, or `null`.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    session: Option<Extension<SessionRecord>>,
) -> Result<Response> {
    let session = session.map(|Extension(s)| s);
    let citoyen = state.auth.current_citoyen(session.as_ref()).await?;

    let response = MeResponse {
        success: true,
        citoyen,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
