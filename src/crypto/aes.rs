use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};
use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Copies a key out of a slice, which must be exactly `KEY_SIZE` bytes long.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| AppError::Encryption(format!("Key must be {} bytes", KEY_SIZE)))?;
        Ok(Self(key))
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Generates a new random AES-GCM nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts `plaintext` with AES-256-GCM under a fresh nonce.
///
/// # Returns
///
/// `nonce || ciphertext`, where the ciphertext carries the 16-byte GCM tag.
pub fn seal(key: &SecureKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Opens a `nonce || ciphertext` buffer produced by [`seal`].
///
/// Fails when the buffer is too short or the tag does not verify.
pub fn open(key: &SecureKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE {
        return Err(AppError::Encryption("Sealed payload too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reverses_seal() {
        let key = SecureKey::new([7u8; KEY_SIZE]);
        let sealed = seal(&key, b"payload").unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), b"payload");
    }

    #[test]
    fn open_rejects_wrong_key_and_short_input() {
        let sealed = seal(&SecureKey::new([1u8; KEY_SIZE]), b"payload").unwrap();
        assert!(open(&SecureKey::new([2u8; KEY_SIZE]), &sealed).is_err());
        assert!(open(&SecureKey::new([1u8; KEY_SIZE]), &sealed[..5]).is_err());
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(SecureKey::from_slice(&[0u8; 16]).is_err());
        assert!(SecureKey::from_slice(&[0u8; KEY_SIZE]).is_ok());
    }
}
