use redis::aio::ConnectionManager;
use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::repositories::agent::{AgentRepository, PgAgentRepository};
use crate::repositories::citoyen::{CitoyenRepository, PgCitoyenRepository};
use crate::repositories::demande::{DemandeRepository, PgDemandeRepository};
use crate::services::auth::AuthService;
use crate::services::demandes::DemandeService;
use crate::session::codec::SessionCodec;
use crate::session::revocation::{MemoryRevocationStore, RedisRevocationStore, RevocationStore};
use crate::session::store::SessionManager;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Session issuing and resolution.
    pub sessions: SessionManager,
    /// Citizen and agent authentication.
    pub auth: AuthService,
    /// The demande lifecycle.
    pub demandes: DemandeService,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL, and by Redis when `REDIS_URL` is set.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let revocations: Arc<dyn RevocationStore> = match &config.redis_url {
            Some(url) => {
                let redis_client = redis::Client::open(url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized (revocation set)");
                Arc::new(RedisRevocationStore::new(redis))
            }
            None => {
                tracing::warn!("⚠️  REDIS_URL not set, revoked sessions are kept in memory");
                Arc::new(MemoryRevocationStore::new())
            }
        };

        Self::with_repositories(
            config.clone(),
            Arc::new(PgCitoyenRepository::new(db.clone())),
            Arc::new(PgAgentRepository::new(db.clone())),
            Arc::new(PgDemandeRepository::new(db)),
            revocations,
        )
    }

    /// Creates an `AppState` over the given collaborators.
    pub fn with_repositories(
        config: Config,
        citoyens: Arc<dyn CitoyenRepository>,
        agents: Arc<dyn AgentRepository>,
        demandes: Arc<dyn DemandeRepository>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Result<Self> {
        let codec = SessionCodec::new(&config.session_secret)?;
        let sessions = SessionManager::new(
            codec,
            revocations,
            config.session_duration_days,
            config.secure_cookies,
        );

        Ok(AppState {
            sessions,
            auth: AuthService::new(citoyens.clone(), agents),
            demandes: DemandeService::new(citoyens, demandes),
            config,
        })
    }
}
