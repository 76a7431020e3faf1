use std::sync::Arc;

use nostr::Keys;

use crate::adapters::decryptors::nip04_decryptor::Nip04Decryptor;
use crate::adapters::decryptors::nip44_decryptor::Nip44Decryptor;
use crate::config::app_config::AppConfig;
use crate::core::errors::{DmError, Result};
use crate::core::services::scheme_hints::normalize_scheme;
use crate::core::services::scheme_registry::SchemeRegistry;
use crate::core::traits::decryptor::Decryptor;

/// Build the scheme registry from the `[[decryptors]]` entries, all
/// backed by the local identity.
pub fn build_registry(config: &AppConfig, keys: &Keys) -> Result<SchemeRegistry> {
    let mut registry = SchemeRegistry::new();

    for entry in &config.decryptors {
        let scheme = normalize_scheme(&entry.scheme).unwrap_or_default();
        let decryptor: Arc<dyn Decryptor> = match scheme.as_str() {
            "nip44_v2" | "nip44" => Arc::new(
                Nip44Decryptor::new(keys.clone(), entry.source.clone())
                    .with_scheme(scheme)
                    .with_priority(entry.priority),
            ),
            "nip04" => Arc::new(
                Nip04Decryptor::new(keys.clone(), entry.source.clone())
                    .with_priority(entry.priority),
            ),
            _ => {
                return Err(DmError::UnknownScheme {
                    scheme: entry.scheme.clone(),
                });
            }
        };
        registry = registry.register(decryptor);
    }

    Ok(registry)
}
