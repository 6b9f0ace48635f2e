use axum::{
    Router,
    routing::{get, patch, post},
    middleware::from_fn_with_state,
};

use http::{HeaderValue, Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};
use tracing::Level;

use crate::{
    error::{AppError, Result},
    handlers,
    middleware_layer::auth::{gate_pages, require_admin, require_auth},
    state::AppState,
};

/// Seconds between two replenished auth requests, per peer IP.
const AUTH_REPLENISH_SECS: u64 = 1;
/// Auth requests a single peer IP may send in a burst.
const AUTH_BURST: u32 = 20;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://[::1]:3000"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the portal's router: JSON API, gated static pages and the shared layers.
///
/// The server must be run with `into_make_service_with_connect_info::<SocketAddr>()`
/// for the per-IP rate limiter.
pub fn build_router(state: AppState) -> Result<Router> {
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(AUTH_REPLENISH_SECS)
            .burst_size(AUTH_BURST)
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limiter configuration".to_string()))?,
    );

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/admin/auth/login", post(handlers::auth::admin_login))
        .layer(tower_governor::GovernorLayer::new(auth_governor_conf))
        .with_state(state.clone());

    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .with_state(state.clone());

    let citizen_routes = Router::new()
        .route("/api/demandes", post(handlers::demandes::create))
        .route("/api/demandes/mine", get(handlers::demandes::mine))
        .route("/api/demandes/{id}", get(handlers::demandes::get_one))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/api/admin/demandes", get(handlers::demandes::list_admin))
        .route(
            "/api/admin/demandes/{id}/statut",
            patch(handlers::demandes::update_statut),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .with_state(state.clone());

    let app = Router::new()
        .merge(auth_routes)
        .merge(session_routes)
        .merge(citizen_routes)
        .merge(admin_routes)
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(from_fn_with_state(state.clone(), gate_pages))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors());

    Ok(app)
}
