use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use crate::crypto::aes::{self, SecureKey};
use crate::error::{AppError, Result};
use crate::models::session::SessionRecord;

/// Tokens longer than this are rejected before decoding.
const MAX_TOKEN_LEN: usize = 4096;

/// Seals session records into opaque, tamper-evident tokens.
///
/// Token layout: `base64url(nonce || AES-256-GCM(bincode(record)))`. The GCM tag is the
/// integrity check; the expiry travels inside the sealed record.
pub struct SessionCodec {
    key: SecureKey,
}

impl SessionCodec {
    /// Creates a codec from the 32-byte session secret.
    pub fn new(secret: &[u8]) -> Result<Self> {
        Ok(Self {
            key: SecureKey::from_slice(secret)?,
        })
    }

    /// Encodes `record` into a token.
    pub fn encode(&self, record: &SessionRecord) -> Result<String> {
        let payload = bincode::serde::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;
        let sealed = aes::seal(&self.key, &payload)?;
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decodes a token, returning `None` for any token that is not a live session.
    pub fn decode(&self, token: Option<&str>) -> Option<SessionRecord> {
        self.decode_at(token, Utc::now())
    }

    /// Like [`decode`](Self::decode), with an explicit clock.
    pub fn decode_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Option<SessionRecord> {
        let token = token.filter(|t| !t.is_empty())?;

        if token.len() > MAX_TOKEN_LEN {
            tracing::debug!("Session token rejected: too long");
            return None;
        }

        let sealed = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| tracing::debug!("Session token rejected: {}", e))
            .ok()?;

        let payload = aes::open(&self.key, &sealed)
            .map_err(|e| tracing::debug!("Session token rejected: {}", e))
            .ok()?;

        let (record, _): (SessionRecord, usize) =
            bincode::serde::decode_from_slice(&payload, bincode::config::standard())
                .map_err(|e| tracing::debug!("Session payload rejected: {}", e))
                .ok()?;

        if record.is_expired_at(now) {
            tracing::debug!("Session expired for user: {}", record.user_id);
            return None;
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Role;
    use chrono::Duration;
    use uuid::Uuid;

    fn codec() -> SessionCodec {
        SessionCodec::new(&[42u8; 32]).unwrap()
    }

    fn record(role: Role) -> SessionRecord {
        SessionRecord::issue(Uuid::new_v4(), role, Utc::now(), Duration::days(7))
    }

    #[test]
    fn decode_returns_the_encoded_record() {
        let codec = codec();
        for role in [Role::Citoyen, Role::Administrateur, Role::Agent] {
            let original = record(role);
            let token = codec.encode(&original).unwrap();
            assert_eq!(codec.decode(Some(&token)), Some(original));
        }
    }

    #[test]
    fn expired_records_decode_to_none() {
        let codec = codec();
        let now = Utc::now();
        let past = SessionRecord::issue(Uuid::new_v4(), Role::Citoyen, now - Duration::days(8), Duration::days(7));
        let token = codec.encode(&past).unwrap();
        assert_eq!(codec.decode(Some(&token)), None);

        let live = record(Role::Citoyen);
        let token = codec.encode(&live).unwrap();
        assert_eq!(codec.decode_at(Some(&token), live.expires_at), None);
        assert!(codec.decode_at(Some(&token), live.expires_at - Duration::seconds(1)).is_some());
    }

    #[test]
    fn any_modified_character_is_rejected() {
        let codec = codec();
        let token = codec.encode(&record(Role::Agent)).unwrap();
        for i in 0..token.len() {
            let mut chars: Vec<char> = token.chars().collect();
            chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
            let tampered: String = chars.into_iter().collect();
            assert_eq!(codec.decode(Some(&tampered)), None, "position {}", i);
        }
    }

    #[test]
    fn any_flipped_byte_is_rejected() {
        let codec = codec();
        let token = codec.encode(&record(Role::Citoyen)).unwrap();
        let sealed = URL_SAFE_NO_PAD.decode(&token).unwrap();
        for i in 0..sealed.len() {
            let mut bytes = sealed.clone();
            bytes[i] ^= 0x01;
            let tampered = URL_SAFE_NO_PAD.encode(bytes);
            assert_eq!(codec.decode(Some(&tampered)), None, "byte {}", i);
        }
    }

    #[test]
    fn garbage_and_absent_tokens_are_none() {
        let codec = codec();
        assert_eq!(codec.decode(None), None);
        assert_eq!(codec.decode(Some("")), None);
        assert_eq!(codec.decode(Some("!!not base64!!")), None);
        assert_eq!(codec.decode(Some("AAAA")), None);
        assert_eq!(codec.decode(Some(&"A".repeat(MAX_TOKEN_LEN + 1))), None);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = codec().encode(&record(Role::Citoyen)).unwrap();
        let other = SessionCodec::new(&[7u8; 32]).unwrap();
        assert_eq!(other.decode(Some(&token)), None);
    }
}
