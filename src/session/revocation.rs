use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Server-side set of sessions that were ended before their natural expiry.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks a session as revoked until `expires_at`.
    async fn revoke(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> Result<()>;

    /// Whether the session was revoked.
    async fn is_revoked(&self, session_id: Uuid) -> Result<bool>;

    /// Drops entries whose token has expired anyway. Returns how many were dropped.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// An in-process revocation set.
#[derive(Clone, Default)]
pub struct MemoryRevocationStore {
    revoked: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl MemoryRevocationStore {
    /// Creates a new, empty `MemoryRevocationStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of tracked sessions.
    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> Result<()> {
        let now = Utc::now();
        if expires_at <= now {
            return Ok(());
        }
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(session_id, expires_at);
        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        Ok(self.revoked.read().await.contains_key(&session_id))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp > now);
        Ok(before - revoked.len())
    }
}

/// A revocation set shared by every instance through Redis.
///
/// Keys expire with the session they revoke.
#[derive(Clone)]
pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(session_id: Uuid) -> String {
        format!("revoked_session:{}", session_id)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> Result<()> {
        let ttl = (expires_at - Utc::now()).num_seconds();
        if ttl <= 0 {
            return Ok(());
        }
        let mut redis = self.redis.clone();
        let _: () = redis.set_ex(Self::key(session_id), 1, ttl as u64).await?;
        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        let mut redis = self.redis.clone();
        let exists: bool = redis.exists(Self::key(session_id)).await?;
        Ok(exists)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
        Ok(0)
    }
}
