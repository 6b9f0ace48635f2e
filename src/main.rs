use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etat_civil::{app::build_router, config::Config, state::AppState};

/// How often expired entries are dropped from the revocation set.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    if let Some(admin) = &config.bootstrap_admin {
        match state
            .auth
            .ensure_admin_exists(&admin.email, admin.password.clone())
            .await
        {
            Ok(_) => tracing::info!("✅ Administrator bootstrap completed"),
            Err(e) => {
                tracing::error!("❌ Failed to ensure administrator exists: {}", e);
                return Err(e.into());
            }
        }
    }

    let app = build_router(state.clone())?;

    let purge_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(PURGE_INTERVAL).await;
            tracing::info!("🧹 Purging expired session revocations...");
            match purge_state.sessions.purge_revocations().await {
                Ok(purged) => {
                    tracing::info!("✅ Purge completed: {} entries removed", purged);
                }
                Err(e) => {
                    tracing::error!("❌ Purge failed: {}", e);
                }
            }
        }
    });

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
