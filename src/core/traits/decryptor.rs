use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::DecryptError;
use crate::core::models::decrypt_result::Stage;
use crate::core::models::event::EncryptedEvent;
use crate::core::services::scheme_hints::normalize_scheme;

/// What an adapter is told about the attempt it is serving.
#[derive(Debug, Clone)]
pub struct DecryptContext {
    /// Event whose content is being decrypted (the wrap, seal, or DM).
    pub event: Arc<EncryptedEvent>,
    pub stage: Stage,
    pub remote_pubkey: String,
}

/// Port for decryption schemes.
///
/// Implementations live in `adapters::decryptors` (e.g. Nip44Decryptor,
/// Nip04Decryptor). The core layer only depends on this trait, never on
/// a concrete scheme. Implementations must be safe to call concurrently
/// and redundantly: the resolver invokes the same adapter for several
/// candidate keys at once.
#[async_trait]
pub trait Decryptor: Send + Sync {
    /// Scheme identifier (e.g. "nip44_v2", "nip04").
    fn scheme(&self) -> &str;

    /// Where the key material comes from (e.g. "local", "extension").
    fn source(&self) -> &str;

    /// Lower runs first. Overrides hint and base ordering.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this adapter can unwrap gift-wrapped messages.
    fn supports_gift_wrap(&self) -> bool {
        normalize_scheme(self.scheme()).is_some_and(|scheme| scheme.starts_with("nip44"))
    }

    /// Recover the plaintext of `ciphertext` assuming `remote_pubkey`
    /// is the counterparty.
    ///
    /// Returns raw bytes; the resolver validates them as UTF-8.
    async fn decrypt(
        &self,
        remote_pubkey: &str,
        ciphertext: &str,
        context: &DecryptContext,
    ) -> Result<Vec<u8>, DecryptError>;
}
