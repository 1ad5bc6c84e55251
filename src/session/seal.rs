//! AES-256-GCM session cookie sealing

use crate::error::{AppError, Result};
use crate::session::SessionData;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const NONCE_SIZE: usize = 12;

/// Seals session claims into an opaque cookie value and back.
///
/// Wire format: `base64(nonce).base64(ciphertext)`. The cipher key is the
/// SHA-256 digest of `AUTH_KEY`, so any key material of sufficient length
/// works without a separate key file. Tampered, truncated, or foreign-key
/// cookies fail closed with a session error.
pub struct SessionSealer {
    cipher: Aes256Gcm,
}

impl SessionSealer {
    /// Create a sealer keyed from the configured auth secret.
    pub fn new(auth_key: &str) -> Self {
        let key = Sha256::digest(auth_key.as_bytes());
        Self {
            // SHA-256 output is exactly the 32 bytes AES-256 wants.
            cipher: Aes256Gcm::new_from_slice(&key).expect("digest is 32 bytes"),
        }
    }

    fn generate_nonce() -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    /// Seal session claims into a cookie value.
    pub fn seal(&self, session: &SessionData) -> Result<String> {
        let plaintext = serde_json::to_string(session)?;

        let nonce_bytes = Self::generate_nonce();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Session(format!("Failed to seal session: {}", e)))?;

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        Ok(format!(
            "{}.{}",
            engine.encode(nonce_bytes),
            engine.encode(&ciphertext)
        ))
    }

    /// Unseal a cookie value back into session claims.
    ///
    /// Any malformed or undecryptable input maps to `AppError::Session`;
    /// callers treat that the same as a missing cookie.
    pub fn unseal(&self, sealed: &str) -> Result<SessionData> {
        let (nonce_b64, ciphertext_b64) = sealed
            .split_once('.')
            .ok_or_else(|| AppError::Session("Malformed session cookie".to_string()))?;

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let nonce_bytes = engine
            .decode(nonce_b64)
            .map_err(|e| AppError::Session(format!("Invalid nonce encoding: {}", e)))?;
        let ciphertext = engine
            .decode(ciphertext_b64)
            .map_err(|e| AppError::Session(format!("Invalid ciphertext encoding: {}", e)))?;

        if nonce_bytes.len() != NONCE_SIZE {
            return Err(AppError::Session(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }

        let nonce = Nonce::from_slice(&nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| AppError::Session("Session cookie failed decryption".to_string()))?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| AppError::Session(format!("Invalid session payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealer() -> SessionSealer {
        SessionSealer::new("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn test_seal_unseal_roundtrip() {
        let sealer = sealer();
        let session = SessionData::new("s.prizio", "token-abc", vec!["TRADER".to_string()]);

        let sealed = sealer.seal(&session).unwrap();
        let unsealed = sealer.unseal(&sealed).unwrap();

        assert_eq!(unsealed.username, "s.prizio");
        assert_eq!(unsealed.token, "token-abc");
        assert_eq!(unsealed.roles, vec!["TRADER".to_string()]);
        assert!(unsealed.is_logged_in);
    }

    #[test]
    fn test_seal_is_randomized() {
        let sealer = sealer();
        let session = SessionData::new("s.prizio", "token-abc", vec![]);

        // Same claims, different nonce, different cookie value.
        let first = sealer.seal(&session).unwrap();
        let second = sealer.seal(&session).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_tampered_cookie_rejected() {
        let sealer = sealer();
        let session = SessionData::new("s.prizio", "token-abc", vec![]);
        let sealed = sealer.seal(&session).unwrap();

        // Flip one interior ciphertext character to a guaranteed-different
        // value; trailing-character edits can be no-ops in unpadded base64.
        let dot = sealed.find('.').unwrap();
        let target = dot + 4;
        let original = sealed.as_bytes()[target];
        let replacement = if original == b'A' { b'B' } else { b'A' };
        let mut tampered = sealed.into_bytes();
        tampered[target] = replacement;
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            sealer.unseal(&tampered),
            Err(AppError::Session(_))
        ));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let session = SessionData::new("s.prizio", "token-abc", vec![]);
        let sealed = sealer().seal(&session).unwrap();

        let other = SessionSealer::new("ffffffffffffffffffffffffffffffff");
        assert!(matches!(other.unseal(&sealed), Err(AppError::Session(_))));
    }

    #[test]
    fn test_garbage_input_rejected() {
        let sealer = sealer();
        assert!(sealer.unseal("").is_err());
        assert!(sealer.unseal("no-separator").is_err());
        assert!(sealer.unseal("not!base64.also!not").is_err());
        assert!(sealer.unseal("YWJj.YWJj").is_err());
    }

    #[test]
    fn test_expired_session_still_unseals() {
        // Expiry is a claims-level check; the sealer only vouches for
        // integrity.
        let sealer = sealer();
        let mut session = SessionData::new("s.prizio", "token-abc", vec![]);
        session.expires_at = 0;

        let unsealed = sealer.unseal(&sealer.seal(&session).unwrap()).unwrap();
        assert!(unsealed.is_expired());
        assert!(!unsealed.is_valid());
    }
}
