use async_trait::async_trait;
use nostr::Keys;
use nostr::nips::nip04;

use super::parse_public_key;
use crate::core::errors::DecryptError;
use crate::core::traits::decryptor::{DecryptContext, Decryptor};

/// Legacy NIP-04 backend: secp256k1 ECDH + AES-256-CBC.
///
/// Kept for old clients. Cannot unwrap gift wraps.
pub struct Nip04Decryptor {
    keys: Keys,
    source: String,
    priority: i32,
}

impl Nip04Decryptor {
    pub fn new(keys: Keys, source: impl Into<String>) -> Self {
        Self {
            keys,
            source: source.into(),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl Decryptor for Nip04Decryptor {
    fn scheme(&self) -> &str {
        "nip04"
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports_gift_wrap(&self) -> bool {
        false
    }

    async fn decrypt(
        &self,
        remote_pubkey: &str,
        ciphertext: &str,
        _context: &DecryptContext,
    ) -> Result<Vec<u8>, DecryptError> {
        let public_key = parse_public_key(remote_pubkey)?;

        nip04::decrypt_to_bytes(self.keys.secret_key(), &public_key, ciphertext).map_err(|e| {
            DecryptError::Cipher {
                scheme: "nip04".to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::models::decrypt_result::Stage;
    use crate::core::models::event::EncryptedEvent;

    fn context(remote: &str) -> DecryptContext {
        DecryptContext {
            event: Arc::new(EncryptedEvent {
                id: String::new(),
                pubkey: remote.to_string(),
                created_at: None,
                kind: 4,
                tags: Vec::new(),
                content: String::new(),
                sig: None,
            }),
            stage: Stage::Content,
            remote_pubkey: remote.to_string(),
        }
    }

    #[tokio::test]
    async fn decrypts_legacy_dm() {
        let alice = Keys::generate();
        let bob = Keys::generate();
        let ciphertext = nip04::encrypt(alice.secret_key(), &bob.public_key(), "legacy").unwrap();

        let decryptor = Nip04Decryptor::new(bob, "local");
        let alice_hex = alice.public_key().to_hex();
        let plaintext = decryptor
            .decrypt(&alice_hex, &ciphertext, &context(&alice_hex))
            .await
            .unwrap();

        assert_eq!(plaintext, b"legacy");
    }

    #[tokio::test]
    async fn sender_can_decrypt_own_message_with_recipient_key() {
        let alice = Keys::generate();
        let bob = Keys::generate();
        let ciphertext = nip04::encrypt(alice.secret_key(), &bob.public_key(), "sent").unwrap();

        let decryptor = Nip04Decryptor::new(alice, "local");
        let bob_hex = bob.public_key().to_hex();
        let plaintext = decryptor
            .decrypt(&bob_hex, &ciphertext, &context(&bob_hex))
            .await
            .unwrap();

        assert_eq!(plaintext, b"sent");
    }

    #[tokio::test]
    async fn garbage_ciphertext_fails() {
        let alice = Keys::generate();
        let decryptor = Nip04Decryptor::new(Keys::generate(), "local");
        let alice_hex = alice.public_key().to_hex();

        let result = decryptor
            .decrypt(&alice_hex, "not-a-nip04-payload", &context(&alice_hex))
            .await;

        assert!(matches!(result, Err(DecryptError::Cipher { .. })));
    }

    #[test]
    fn does_not_support_gift_wrap() {
        let decryptor = Nip04Decryptor::new(Keys::generate(), "local");

        assert_eq!(decryptor.scheme(), "nip04");
        assert!(!decryptor.supports_gift_wrap());
    }
}
