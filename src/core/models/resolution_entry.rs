use serde::{Deserialize, Serialize};

use crate::core::models::decrypt_result::DecryptResult;

/// One failed attempt, as kept in the diagnostics log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub scheme: String,
    pub source: String,
    pub stage: String,
    pub candidate_key: Option<String>,
    pub cause: String,
}

/// A single entry in the diagnostics log (JSON lines format).
///
/// Records which schemes and keys were tried and why they failed.
/// Never carries plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_id: String,
    pub kind: u16,
    pub ok: bool,
    pub scheme: Option<String>,
    pub source: Option<String>,
    pub remote_pubkey: Option<String>,
    pub failures: Vec<FailureSummary>,
}

impl ResolutionEntry {
    /// Summarize a resolution outcome, dropping everything secret.
    pub fn from_result(result: &DecryptResult) -> Self {
        let event = result.event();
        let mut entry = Self {
            timestamp: chrono::Utc::now(),
            event_id: event.id.clone(),
            kind: event.kind,
            ok: result.is_ok(),
            scheme: None,
            source: None,
            remote_pubkey: None,
            failures: Vec::new(),
        };

        match result {
            DecryptResult::Success(success) => {
                entry.scheme = Some(success.scheme.clone());
                entry.source = Some(success.decryptor.source.clone());
                entry.remote_pubkey = Some(success.remote_pubkey.clone());
            }
            DecryptResult::Failure(failure) => {
                entry.failures = failure
                    .errors
                    .iter()
                    .map(|record| FailureSummary {
                        scheme: record.scheme.clone(),
                        source: record.source.clone(),
                        stage: record.stage.to_string(),
                        candidate_key: record.candidate_key.clone(),
                        cause: record.cause.to_string(),
                    })
                    .collect();
            }
        }

        entry
    }
}
