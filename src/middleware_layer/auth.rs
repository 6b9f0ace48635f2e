use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, GENERIC_ERROR_MESSAGE},
    models::session::SessionRecord,
    policy::{self, Decision},
    state::AppState,
};

/// The session of the current request: the one `gate_pages` resolved, or a fresh lookup.
async fn current_session(
    state: &AppState,
    cookies: &Cookies,
    resolved: Option<SessionRecord>,
) -> Option<SessionRecord> {
    match resolved {
        Some(session) => Some(session),
        None => state.sessions.get_session(cookies).await,
    }
}

/// Applies the access policy to every inbound request.
///
/// Redirect decisions are answered with `307 Temporary Redirect`. Allowed requests
/// carry the resolved [`SessionRecord`], if any, in their extensions.
pub async fn gate_pages(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = state.sessions.get_session(&cookies).await;
    let path = request.uri().path();

    let decision = policy::decide(path, session.as_ref());
    if let Some(location) = decision.location() {
        tracing::debug!("↪️  {} -> {} ({:?})", path, location, decision);
        return Redirect::temporary(location).into_response();
    }
    debug_assert_eq!(decision, Decision::Allow);

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

/// A middleware that requires a valid session to be present.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let resolved = request.extensions().get::<SessionRecord>().cloned();
    let path = request.uri().path().to_string();
    let session = current_session(&state, &cookies, resolved)
        .await
        .ok_or_else(|| {
            tracing::warn!("❌ No valid session for {}", path);
            AppError::Authentication(GENERIC_ERROR_MESSAGE.to_string())
        })?;

    tracing::debug!("✅ User authenticated: {}", session.user_id);
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// A middleware that requires a session with an administrative role.
pub async fn require_admin(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let resolved = request.extensions().get::<SessionRecord>().cloned();
    let session = current_session(&state, &cookies, resolved)
        .await
        .ok_or_else(|| AppError::Authentication(GENERIC_ERROR_MESSAGE.to_string()))?;

    if !session.role.is_administrative() {
        tracing::warn!("❌ {} ({}) denied on {}", session.user_id, session.role, request.uri().path());
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
