use crate::core::errors::DecryptError;
use crate::core::models::decrypt_result::{DecryptFailure, DecryptResult, FailureRecord, Stage};
use crate::core::models::event::EncryptedEvent;

/// Collects failure records in the order attempts complete and turns
/// them into the failure result.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    records: Vec<FailureRecord>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FailureRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records
    }

    /// Build the failure result. Never fails, even with no records.
    pub fn build_failure(
        records: Vec<FailureRecord>,
        event: &EncryptedEvent,
        actor_pubkey: &str,
    ) -> DecryptResult {
        DecryptResult::Failure(DecryptFailure {
            event: event.clone(),
            actor_pubkey: actor_pubkey.to_string(),
            errors: records,
        })
    }

    /// Failure for an event rejected before any adapter ran.
    pub fn input_failure(
        event: &EncryptedEvent,
        actor_pubkey: &str,
        stage: Stage,
        cause: DecryptError,
    ) -> DecryptResult {
        let record = FailureRecord {
            scheme: String::new(),
            source: String::new(),
            stage,
            candidate_key: None,
            cause,
        };
        Self::build_failure(vec![record], event, actor_pubkey)
    }
}
