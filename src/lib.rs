//! Multi-scheme, multi-candidate decryption of encrypted Nostr direct
//! messages.
//!
//! A [`DmResolver`] races every registered [`Decryptor`] against every
//! plausible counterparty key and returns a single [`DecryptResult`]:
//! the first plaintext recovered, or a structured account of why every
//! attempt failed.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;

pub use crate::core::errors::{DecryptError, DmError, Result};
pub use crate::core::models::decrypt_result::{
    DecryptFailure, DecryptResult, DecryptSuccess, Direction, FailureRecord, Stage,
};
pub use crate::core::models::event::EncryptedEvent;
pub use crate::core::models::resolve_context::{EncryptionHints, ResolveContext};
pub use crate::core::services::attempt_orchestrator::RacePolicy;
pub use crate::core::services::dm_resolver::DmResolver;
pub use crate::core::services::scheme_registry::SchemeRegistry;
pub use crate::core::traits::decryptor::{DecryptContext, Decryptor};
