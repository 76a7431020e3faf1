use crate::core::models::decrypt_result::{
    DecryptResult, DecryptSuccess, DecryptorInfo, Direction, Envelope,
};
use crate::core::models::event::EncryptedEvent;
use crate::core::models::recipient::Recipient;
use crate::core::models::resolve_context::EncryptionHints;
use crate::core::services::attempt_orchestrator::Attempt;
use crate::core::services::scheme_hints::normalize_scheme;

/// Everything the builder needs from a won resolution.
pub struct Winning<'a> {
    /// The event the resolver was called with.
    pub event: &'a EncryptedEvent,
    /// The decrypted message, content not yet replaced.
    pub message: &'a EncryptedEvent,
    pub plaintext: String,
    pub recipients: Vec<Recipient>,
    pub sender_pubkey: Option<String>,
    pub actor_pubkey: &'a str,
    pub attempt: &'a Attempt,
    pub hints: &'a EncryptionHints,
    pub envelope: Option<Envelope>,
}

/// Turns a winning attempt into the canonical success result.
pub struct ResultBuilder;

impl ResultBuilder {
    pub fn build_success(winning: Winning<'_>) -> DecryptResult {
        let decryptor = &winning.attempt.decryptor;
        let scheme = Self::resolved_scheme(winning.hints, decryptor.scheme());
        let direction = Self::direction(
            winning.actor_pubkey,
            winning.sender_pubkey.as_deref(),
            &winning.recipients,
        );
        let timestamp = Self::timestamp(winning.message, winning.event);

        DecryptResult::Success(Box::new(DecryptSuccess {
            event: winning.event.clone(),
            message: winning.message.with_content(winning.plaintext.as_str()),
            plaintext: winning.plaintext,
            recipients: winning.recipients,
            sender: winning.sender_pubkey.map(Recipient::sender),
            actor_pubkey: winning.actor_pubkey.to_string(),
            decryptor: DecryptorInfo {
                scheme: normalize_scheme(decryptor.scheme()).unwrap_or_else(|| scheme.clone()),
                source: decryptor.source().to_string(),
            },
            remote_pubkey: winning.attempt.candidate_key.clone(),
            scheme,
            envelope: winning.envelope,
            direction,
            timestamp,
        }))
    }

    /// First normalizable hint, else the winner's own scheme, else empty.
    pub fn resolved_scheme(hints: &EncryptionHints, winner_scheme: &str) -> String {
        hints
            .algorithms
            .iter()
            .find_map(|hint| normalize_scheme(hint))
            .or_else(|| normalize_scheme(winner_scheme))
            .unwrap_or_default()
    }

    pub fn direction(actor: &str, sender: Option<&str>, recipients: &[Recipient]) -> Direction {
        if actor.is_empty() {
            return Direction::Unknown;
        }
        if sender == Some(actor) {
            return Direction::Outgoing;
        }
        if recipients.iter().any(|r| r.pubkey == actor) {
            return Direction::Incoming;
        }
        Direction::Unknown
    }

    /// Latest `created_at` of message and event, else the current time.
    pub fn timestamp(message: &EncryptedEvent, event: &EncryptedEvent) -> u64 {
        message
            .created_at
            .into_iter()
            .chain(event.created_at)
            .max()
            .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::core::errors::DecryptError;
    use crate::core::models::decrypt_result::Stage;
    use crate::core::models::recipient::Role;
    use crate::core::traits::decryptor::{DecryptContext, Decryptor};

    struct Fixed(&'static str);

    #[async_trait]
    impl Decryptor for Fixed {
        fn scheme(&self) -> &str {
            self.0
        }

        fn source(&self) -> &str {
            "local"
        }

        async fn decrypt(
            &self,
            _remote_pubkey: &str,
            _ciphertext: &str,
            _context: &DecryptContext,
        ) -> Result<Vec<u8>, DecryptError> {
            Ok(Vec::new())
        }
    }

    fn key(c: char) -> String {
        c.to_string().repeat(64)
    }

    fn event(created_at: Option<u64>) -> EncryptedEvent {
        EncryptedEvent {
            id: "e1".into(),
            pubkey: key('a'),
            created_at,
            kind: 4,
            tags: vec![vec!["p".into(), key('b')]],
            content: "ciphertext".into(),
            sig: Some("sig".into()),
        }
    }

    fn attempt(scheme: &'static str) -> Attempt {
        Attempt {
            rank: 0,
            decryptor: Arc::new(Fixed(scheme)),
            candidate_key: key('a'),
            stage: Stage::Content,
        }
    }

    fn recipient(c: char) -> Recipient {
        Recipient {
            pubkey: key(c),
            relay_hints: Vec::new(),
            role: Role::Recipient,
        }
    }

    #[test]
    fn success_clones_event_with_plaintext() {
        let original = event(Some(10));
        let attempt = attempt("Scheme-V2");
        let hints = EncryptionHints::default();
        let actor = key('b');

        let result = ResultBuilder::build_success(Winning {
            event: &original,
            message: &original,
            plaintext: "hello".into(),
            recipients: vec![recipient('b')],
            sender_pubkey: Some(key('a')),
            actor_pubkey: &actor,
            attempt: &attempt,
            hints: &hints,
            envelope: None,
        });

        let success = result.success().unwrap();
        assert_eq!(success.plaintext, "hello");
        assert_eq!(success.message.content, "hello");
        assert_eq!(success.message.id, original.id);
        assert_eq!(success.message.tags, original.tags);
        assert_eq!(success.event.content, "ciphertext");
        assert_eq!(original.content, "ciphertext");
        assert_eq!(success.scheme, "scheme-v2");
        assert_eq!(success.decryptor.source, "local");
        assert_eq!(success.direction, Direction::Incoming);
        assert_eq!(success.timestamp, 10);
    }

    #[test]
    fn hint_takes_precedence_over_winner_scheme() {
        let hints = EncryptionHints::new(vec!["  ".into(), "Scheme-V2".into()]);

        assert_eq!(ResultBuilder::resolved_scheme(&hints, "scheme-v1"), "scheme-v2");
    }

    #[test]
    fn winner_scheme_used_without_hints() {
        let hints = EncryptionHints::default();

        assert_eq!(ResultBuilder::resolved_scheme(&hints, "NIP-04"), "nip04");
        assert_eq!(ResultBuilder::resolved_scheme(&hints, ""), "");
    }

    #[test]
    fn direction_from_actor_role() {
        let recipients = vec![recipient('b')];

        assert_eq!(
            ResultBuilder::direction(&key('a'), Some(&key('a')), &recipients),
            Direction::Outgoing
        );
        assert_eq!(
            ResultBuilder::direction(&key('b'), Some(&key('a')), &recipients),
            Direction::Incoming
        );
        assert_eq!(
            ResultBuilder::direction(&key('c'), Some(&key('a')), &recipients),
            Direction::Unknown
        );
        assert_eq!(
            ResultBuilder::direction("", Some(&key('a')), &recipients),
            Direction::Unknown
        );
    }

    #[test]
    fn timestamp_prefers_latest_created_at() {
        assert_eq!(ResultBuilder::timestamp(&event(Some(5)), &event(Some(9))), 9);
        assert_eq!(ResultBuilder::timestamp(&event(None), &event(Some(9))), 9);
        assert!(ResultBuilder::timestamp(&event(None), &event(None)) > 1_600_000_000);
    }
}
