use serde::{Serialize, Serializer};

use crate::core::errors::DecryptError;
use crate::core::models::event::EncryptedEvent;
use crate::core::models::recipient::Recipient;

/// Pipeline stage an attempt was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The event itself was unusable; no adapter was invoked.
    Input,
    /// Outer gift wrap layer.
    Wrap,
    /// Seal inside a gift wrap.
    Seal,
    /// Rumor (the actual message) inside a seal.
    Rumor,
    /// Content of a legacy direct message.
    Content,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Wrap => "wrap",
            Stage::Seal => "seal",
            Stage::Rumor => "rumor",
            Stage::Content => "content",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured account of one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub scheme: String,
    pub source: String,
    pub stage: Stage,
    /// `None` for input-stage records, where no key was tried.
    pub candidate_key: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub cause: DecryptError,
}

fn serialize_display<S: Serializer>(
    value: &DecryptError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Identity of the adapter that produced a win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptorInfo {
    pub scheme: String,
    pub source: String,
}

/// Whether the acting identity sent or received the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
    Unknown,
}

/// Outer layers of an unwrapped gift wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub wrap: EncryptedEvent,
    pub seal: EncryptedEvent,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptSuccess {
    /// The event as received.
    pub event: EncryptedEvent,
    /// The decrypted message: the event (or rumor) with content replaced.
    pub message: EncryptedEvent,
    pub plaintext: String,
    pub recipients: Vec<Recipient>,
    pub sender: Option<Recipient>,
    pub actor_pubkey: String,
    pub decryptor: DecryptorInfo,
    /// Candidate key the winning attempt used.
    pub remote_pubkey: String,
    /// Resolved scheme label.
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<Envelope>,
    pub direction: Direction,
    pub timestamp: u64,
}

/// A resolution where no attempt succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptFailure {
    pub event: EncryptedEvent,
    pub actor_pubkey: String,
    /// Failure records in completion order.
    pub errors: Vec<FailureRecord>,
}

/// Single output of a resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecryptResult {
    Success(Box<DecryptSuccess>),
    Failure(DecryptFailure),
}

impl DecryptResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, DecryptResult::Success(_))
    }

    pub fn success(&self) -> Option<&DecryptSuccess> {
        match self {
            DecryptResult::Success(success) => Some(success),
            DecryptResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DecryptFailure> {
        match self {
            DecryptResult::Success(_) => None,
            DecryptResult::Failure(failure) => Some(failure),
        }
    }

    /// The event the resolution was called with.
    pub fn event(&self) -> &EncryptedEvent {
        match self {
            DecryptResult::Success(success) => &success.event,
            DecryptResult::Failure(failure) => &failure.event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_record_serializes_cause_as_text() {
        let record = FailureRecord {
            scheme: "nip04".into(),
            source: "local".into(),
            stage: Stage::Content,
            candidate_key: Some("ab".repeat(32)),
            cause: DecryptError::InvalidPlaintext,
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["stage"], "content");
        assert_eq!(json["cause"], "decrypted content was not a valid string");
    }

    #[test]
    fn result_is_tagged_by_status() {
        let event = EncryptedEvent {
            id: "e1".into(),
            pubkey: String::new(),
            created_at: None,
            kind: 4,
            tags: Vec::new(),
            content: "x".into(),
            sig: None,
        };
        let result = DecryptResult::Failure(DecryptFailure {
            event,
            actor_pubkey: String::new(),
            errors: Vec::new(),
        });

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "failure");
        assert_eq!(json["errors"], serde_json::json!([]));
        assert!(!result.is_ok());
    }
}
