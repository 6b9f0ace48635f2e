use std::sync::Arc;

use tokio::sync::OnceCell;
use zeroize::Zeroizing;

use crate::crypto::password::{hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::models::agent::{Agent, NewAgent};
use crate::models::citoyen::{Citoyen, CitoyenProfile, NewCitoyen};
use crate::models::session::{Role, SessionRecord};
use crate::repositories::agent::AgentRepository;
use crate::repositories::citoyen::{CitoyenRepository, EMAIL_TAKEN};
use crate::validation::auth::{LoginForm, RegisterForm};

/// The only message a failed login ever produces.
pub const INVALID_CREDENTIALS: &str = "Email ou Mot de passe incorrect";

/// Runs Argon2 off the async workers.
async fn hash_blocking(password: Zeroizing<String>) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(password: Zeroizing<String>, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
}

/// Citizen and agent authentication.
#[derive(Clone)]
pub struct AuthService {
    citoyens: Arc<dyn CitoyenRepository>,
    agents: Arc<dyn AgentRepository>,
    /// Verified against when the email is unknown, so both failures cost one Argon2 run.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    /// Creates a new `AuthService`.
    pub fn new(citoyens: Arc<dyn CitoyenRepository>, agents: Arc<dyn AgentRepository>) -> Self {
        Self {
            citoyens,
            agents,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Burns one password verification and fails with the credentials error.
    async fn reject_unknown(&self, password: Zeroizing<String>) -> AppError {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| hash_blocking(Zeroizing::new("unknown-account".to_string())))
            .await;
        match dummy {
            Ok(hash) => {
                if let Err(e) = verify_blocking(password, hash.clone()).await {
                    tracing::error!("❌ Dummy verification failed: {}", e);
                }
            }
            Err(e) => tracing::error!("❌ Dummy hash unavailable: {}", e),
        }
        AppError::Authentication(INVALID_CREDENTIALS.to_string())
    }

    /// Creates a citizen account.
    ///
    /// # Returns
    ///
    /// The new `Citoyen`, or a conflict when the email is already registered.
    pub async fn register(&self, form: RegisterForm) -> Result<Citoyen> {
        let input = form.parse()?;
        tracing::debug!("📝 Registering citizen: {}", input.email);

        if self.citoyens.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_blocking(input.password).await?;

        let citoyen = self
            .citoyens
            .create(NewCitoyen {
                email: input.email,
                password_hash,
                nom: input.nom,
                prenom: input.prenom,
                date_naissance: input.date_naissance,
            })
            .await?;

        tracing::info!("✅ Citizen created with ID: {}", citoyen.id);
        Ok(citoyen)
    }

    /// Checks citizen credentials.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn authenticate(&self, form: LoginForm) -> Result<Citoyen> {
        let input = form.parse()?;
        tracing::debug!("🔐 Authenticating citizen: {}", input.email);

        let Some(citoyen) = self.citoyens.find_by_email(&input.email).await? else {
            return Err(self.reject_unknown(input.password).await);
        };

        if !verify_blocking(input.password, citoyen.password.clone()).await? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!("✅ Citizen authenticated: {}", citoyen.id);
        Ok(citoyen)
    }

    /// Checks agent credentials.
    pub async fn authenticate_agent(&self, form: LoginForm) -> Result<Agent> {
        let input = form.parse()?;
        tracing::debug!("🔐 Authenticating agent: {}", input.email);

        let agent = self
            .agents
            .find_by_email(&input.email)
            .await?
            .filter(|a| a.role.is_administrative());
        let Some(agent) = agent else {
            return Err(self.reject_unknown(input.password).await);
        };

        if !verify_blocking(input.password, agent.password.clone()).await? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!("✅ Agent authenticated: {} ({})", agent.id, agent.role);
        Ok(agent)
    }

    /// The citizen behind `session`, if it is a citizen session whose account still exists.
    pub async fn current_citoyen(&self, session: Option<&SessionRecord>) -> Result<Option<CitoyenProfile>> {
        let Some(session) = session.filter(|s| s.role == Role::Citoyen) else {
            return Ok(None);
        };
        let citoyen = self.citoyens.find_by_id(session.user_id).await?;
        Ok(citoyen.as_ref().map(CitoyenProfile::from))
    }

    /// Creates the administrator account `email` unless it exists.
    ///
    /// # Returns
    ///
    /// `true` when the account was created.
    pub async fn ensure_admin_exists(&self, email: &str, password: Zeroizing<String>) -> Result<bool> {
        let email = email.trim().to_lowercase();

        if self.agents.find_by_email(&email).await?.is_some() {
            tracing::info!("✅ Administrator {} already exists", email);
            return Ok(false);
        }

        if password.len() < 8 {
            return Err(AppError::Internal(
                "BOOTSTRAP_ADMIN_PASSWORD must be at least 8 characters".to_string(),
            ));
        }

        tracing::warn!("⚠️  Administrator {} not found, creating...", email);
        let password_hash = hash_blocking(password).await?;
        let agent = self
            .agents
            .create(NewAgent {
                email,
                password_hash,
                nom: "Administrateur".to_string(),
                prenom: String::new(),
                role: Role::Administrateur,
            })
            .await?;

        tracing::info!("✅ Administrator created with ID: {}", agent.id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{MemoryAgentRepository, MemoryCitoyenRepository};
    use chrono::{Duration, Utc};

    fn service() -> (AuthService, MemoryCitoyenRepository) {
        let citoyens = MemoryCitoyenRepository::new();
        let service = AuthService::new(
            Arc::new(citoyens.clone()),
            Arc::new(MemoryAgentRepository::new()),
        );
        (service, citoyens)
    }

    fn register_form(email: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_string(),
            password: "Secret123".to_string(),
            nom: "Diop".to_string(),
            prenom: "Awa".to_string(),
            date_naissance: "1990-05-01".to_string(),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn auth_message(result: Result<impl Sized>) -> String {
        match result {
            Err(AppError::Authentication(msg)) => msg,
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an authentication failure"),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, _) = service();
        let created = service.register(register_form("awa@example.sn")).await.unwrap();
        assert_ne!(created.password, "Secret123");

        let logged = service
            .authenticate(login_form("AWA@example.sn", "Secret123"))
            .await
            .unwrap();
        assert_eq!(logged.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, _) = service();
        service.register(register_form("awa@example.sn")).await.unwrap();
        match service.register(register_form("awa@example.sn")).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, EMAIL_TAKEN),
            other => panic!("expected conflict, got {:?}", other.map(|c| c.id)),
        }
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let (service, _) = service();
        service.register(register_form("awa@example.sn")).await.unwrap();

        let unknown = auth_message(service.authenticate(login_form("nobody@example.sn", "Secret123")).await);
        let wrong = auth_message(service.authenticate(login_form("awa@example.sn", "Wrong1234")).await);
        assert_eq!(unknown, INVALID_CREDENTIALS);
        assert_eq!(wrong, INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_verification() {
        let (service, _) = service();
        assert!(service.dummy_hash.get().is_none());

        let msg = auth_message(service.authenticate(login_form("nobody@example.sn", "Secret123")).await);
        assert_eq!(msg, INVALID_CREDENTIALS);
        let dummy = service.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$argon2id$"));

        let msg = auth_message(service.authenticate_agent(login_form("ghost@mairie.sn", "Secret123")).await);
        assert_eq!(msg, INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once_and_can_log_in() {
        let (service, _) = service();
        let password = || Zeroizing::new("AdminPass1".to_string());
        assert!(service.ensure_admin_exists("Admin@Mairie.sn", password()).await.unwrap());
        assert!(!service.ensure_admin_exists("admin@mairie.sn", password()).await.unwrap());

        let agent = service
            .authenticate_agent(login_form("admin@mairie.sn", "AdminPass1"))
            .await
            .unwrap();
        assert_eq!(agent.role, Role::Administrateur);
    }

    #[tokio::test]
    async fn citizens_cannot_use_the_agent_login() {
        let (service, _) = service();
        service.register(register_form("awa@example.sn")).await.unwrap();
        let msg = auth_message(service.authenticate_agent(login_form("awa@example.sn", "Secret123")).await);
        assert_eq!(msg, INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn current_citoyen_follows_the_session() {
        let (service, citoyens) = service();
        let created = service.register(register_form("awa@example.sn")).await.unwrap();
        let session = SessionRecord::issue(created.id, Role::Citoyen, Utc::now(), Duration::days(7));

        let profile = service.current_citoyen(Some(&session)).await.unwrap().unwrap();
        assert_eq!(profile.nom, "Diop");
        assert!(service.current_citoyen(None).await.unwrap().is_none());

        let agent_session = SessionRecord::issue(created.id, Role::Agent, Utc::now(), Duration::days(7));
        assert!(service.current_citoyen(Some(&agent_session)).await.unwrap().is_none());

        citoyens.remove(created.id).await;
        assert!(service.current_citoyen(Some(&session)).await.unwrap().is_none());
    }
}
