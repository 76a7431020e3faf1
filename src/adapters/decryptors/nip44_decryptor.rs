use async_trait::async_trait;
use nostr::Keys;
use nostr::nips::nip44;

use super::parse_public_key;
use crate::core::errors::DecryptError;
use crate::core::traits::decryptor::{DecryptContext, Decryptor};

/// NIP-44 v2 backend: secp256k1 ECDH + HKDF + ChaCha20 with HMAC-SHA256.
///
/// Holds one local identity. Able to unwrap gift wraps, which are
/// NIP-44 encrypted at both layers.
pub struct Nip44Decryptor {
    keys: Keys,
    /// Label this backend registers under ("nip44_v2" or "nip44").
    scheme: String,
    source: String,
    priority: i32,
}

impl Nip44Decryptor {
    pub fn new(keys: Keys, source: impl Into<String>) -> Self {
        Self {
            keys,
            scheme: "nip44_v2".to_string(),
            source: source.into(),
            priority: 0,
        }
    }

    /// Register under a different label, e.g. plain "nip44".
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl Decryptor for Nip44Decryptor {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports_gift_wrap(&self) -> bool {
        true
    }

    async fn decrypt(
        &self,
        remote_pubkey: &str,
        ciphertext: &str,
        _context: &DecryptContext,
    ) -> Result<Vec<u8>, DecryptError> {
        let public_key = parse_public_key(remote_pubkey)?;

        nip44::decrypt_to_bytes(self.keys.secret_key(), &public_key, ciphertext).map_err(|e| {
            DecryptError::Cipher {
                scheme: self.scheme.clone(),
                reason: e.to_string(),
            }
        })
    }
}
