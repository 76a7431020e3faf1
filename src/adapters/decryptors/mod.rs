pub mod nip04_decryptor;
pub mod nip44_decryptor;

use nostr::PublicKey;

use crate::core::errors::DecryptError;

/// Parse a hex counterparty key handed over by the resolver.
fn parse_public_key(remote_pubkey: &str) -> Result<PublicKey, DecryptError> {
    PublicKey::from_hex(remote_pubkey).map_err(|e| DecryptError::InvalidPublicKey {
        pubkey: remote_pubkey.to_string(),
        reason: e.to_string(),
    })
}
