use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::session::{Role, SessionRecord};
use crate::session::codec::SessionCodec;
use crate::session::revocation::RevocationStore;
use crate::session::transport::{CookieAttributes, CookieJar};

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "session";
const SESSION_COOKIE_PATH: &str = "/";

/// Issues, resolves and ends sessions carried by the `session` cookie.
#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<SessionCodec>,
    revocations: Arc<dyn RevocationStore>,
    duration: chrono::Duration,
    secure_cookies: bool,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    pub fn new(
        codec: SessionCodec,
        revocations: Arc<dyn RevocationStore>,
        duration_days: i64,
        secure_cookies: bool,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            revocations,
            duration: chrono::Duration::days(duration_days),
            secure_cookies,
        }
    }

    fn cookie_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            max_age_secs: self.duration.num_seconds(),
            http_only: true,
            secure: self.secure_cookies,
            same_site_strict: true,
            path: SESSION_COOKIE_PATH,
        }
    }

    /// Starts a session for `user_id` and writes it to the response cookies.
    ///
    /// `role` defaults to [`Role::Citoyen`].
    pub fn create_session(
        &self,
        jar: &dyn CookieJar,
        user_id: Uuid,
        role: Option<Role>,
    ) -> Result<SessionRecord> {
        let record = SessionRecord::issue(user_id, role.unwrap_or_default(), Utc::now(), self.duration);
        let token = self.codec.encode(&record)?;
        jar.set(SESSION_COOKIE, token, &self.cookie_attributes());

        tracing::info!("✅ Session issued for {} ({})", record.user_id, record.role);
        Ok(record)
    }

    /// Resolves the session of the current request, if it is live and not revoked.
    pub async fn get_session(&self, jar: &dyn CookieJar) -> Option<SessionRecord> {
        let token = jar.get(SESSION_COOKIE);
        let record = self.codec.decode(token.as_deref())?;

        match self.revocations.is_revoked(record.session_id).await {
            Ok(false) => Some(record),
            Ok(true) => {
                tracing::debug!("Session {} was revoked", record.session_id);
                None
            }
            Err(e) => {
                tracing::error!("❌ Revocation lookup failed, rejecting session: {}", e);
                None
            }
        }
    }

    /// Ends the current session. Safe to call when there is none.
    pub async fn delete_session(&self, jar: &dyn CookieJar) {
        let token = jar.get(SESSION_COOKIE);
        if let Some(record) = self.codec.decode(token.as_deref()) {
            if let Err(e) = self.revocations.revoke(record.session_id, record.expires_at).await {
                tracing::error!("❌ Failed to revoke session {}: {}", record.session_id, e);
            }
            tracing::info!("👋 Session {} ended for {}", record.session_id, record.user_id);
        }
        jar.clear(SESSION_COOKIE, SESSION_COOKIE_PATH);
    }

    /// Drops revocation entries that outlived their sessions.
    pub async fn purge_revocations(&self) -> Result<usize> {
        self.revocations.purge_expired(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::revocation::MemoryRevocationStore;
    use crate::session::transport::memory::MemoryCookieJar;

    fn manager() -> SessionManager {
        SessionManager::new(
            SessionCodec::new(&[3u8; 32]).unwrap(),
            Arc::new(MemoryRevocationStore::new()),
            7,
            true,
        )
    }

    #[tokio::test]
    async fn created_session_is_read_back() {
        let sessions = manager();
        let jar = MemoryCookieJar::default();
        let user = Uuid::new_v4();

        let issued = sessions.create_session(&jar, user, None).unwrap();
        assert_eq!(issued.role, Role::Citoyen);
        assert_eq!(issued.expires_at - issued.issued_at, chrono::Duration::days(7));

        let read = sessions.get_session(&jar).await.unwrap();
        assert_eq!(read, issued);
    }

    #[tokio::test]
    async fn cookie_is_strict_http_only_and_site_wide() {
        let sessions = manager();
        let jar = MemoryCookieJar::default();
        sessions.create_session(&jar, Uuid::new_v4(), Some(Role::Agent)).unwrap();

        let attrs = jar.attributes(SESSION_COOKIE).unwrap();
        assert!(attrs.http_only);
        assert!(attrs.secure);
        assert!(attrs.same_site_strict);
        assert_eq!(attrs.path, "/");
        assert_eq!(attrs.max_age_secs, 7 * 86400);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let sessions = manager();
        let jar = MemoryCookieJar::default();
        sessions.create_session(&jar, Uuid::new_v4(), None).unwrap();

        sessions.delete_session(&jar).await;
        assert!(sessions.get_session(&jar).await.is_none());
        sessions.delete_session(&jar).await;
        assert!(sessions.get_session(&jar).await.is_none());
    }

    #[tokio::test]
    async fn deleted_token_stops_working_even_if_replayed() {
        let sessions = manager();
        let jar = MemoryCookieJar::default();
        sessions.create_session(&jar, Uuid::new_v4(), None).unwrap();
        let stolen = jar.get(SESSION_COOKIE).unwrap();

        sessions.delete_session(&jar).await;

        let attacker = MemoryCookieJar::default();
        attacker.insert_raw(SESSION_COOKIE, &stolen);
        assert!(sessions.get_session(&attacker).await.is_none());
    }

    #[tokio::test]
    async fn garbage_cookie_is_no_session() {
        let sessions = manager();
        let jar = MemoryCookieJar::default();
        jar.insert_raw(SESSION_COOKIE, "garbage");
        assert!(sessions.get_session(&jar).await.is_none());
        sessions.delete_session(&jar).await;
        assert!(jar.get(SESSION_COOKIE).is_none());
    }
}
