use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::core::errors::DecryptError;
use crate::core::models::decrypt_result::{DecryptResult, Envelope, Stage};
use crate::core::models::event::{EncryptedEvent, GIFT_WRAP_KIND, LEGACY_DM_KIND};
use crate::core::models::resolve_context::{EncryptionHints, ResolveContext};
use crate::core::services::attempt_orchestrator::{
    AttemptFailure, AttemptOrchestrator, RaceOutcome, RacePolicy,
};
use crate::core::services::candidate_keys::{CandidateKeyResolver, collect_recipients};
use crate::core::services::error_aggregator::ErrorAggregator;
use crate::core::services::result_builder::{ResultBuilder, Winning};
use crate::core::services::scheme_hints::{merge_hints, normalize_hex, parse_encryption_hints};
use crate::core::services::scheme_registry::SchemeRegistry;
use crate::core::traits::decryptor::{DecryptContext, Decryptor};

/// Resolves encrypted direct messages against a registry of schemes.
///
/// Holds no per-call state; one instance can serve any number of
/// concurrent `resolve` calls.
#[derive(Debug, Clone)]
pub struct DmResolver {
    registry: SchemeRegistry,
    orchestrator: AttemptOrchestrator,
}

/// Seal and rumor recovered from a gift wrap.
struct Unwrapped {
    seal: EncryptedEvent,
    rumor: EncryptedEvent,
}

impl DmResolver {
    pub fn new(registry: SchemeRegistry, policy: RacePolicy) -> Self {
        Self {
            registry,
            orchestrator: AttemptOrchestrator::new(policy),
        }
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    pub fn policy(&self) -> RacePolicy {
        self.orchestrator.policy()
    }

    /// Decrypt `event`, trying every plausible (scheme, key) pair.
    ///
    /// Never fails: an undecryptable message comes back as
    /// `DecryptResult::Failure` carrying one record per failed attempt.
    #[instrument(skip_all, fields(event_id = %event.id, kind = event.kind))]
    pub async fn resolve(&self, event: &EncryptedEvent, context: &ResolveContext) -> DecryptResult {
        let actor = context
            .actor_pubkey
            .as_deref()
            .and_then(normalize_hex)
            .unwrap_or_default();

        if !matches!(event.kind, LEGACY_DM_KIND | GIFT_WRAP_KIND) {
            warn!("unsupported DM event kind");
            return ErrorAggregator::input_failure(
                event,
                &actor,
                Stage::Input,
                DecryptError::UnsupportedKind { kind: event.kind },
            );
        }

        if self.registry.is_empty() {
            warn!("no decryptors registered");
            return ErrorAggregator::build_failure(Vec::new(), event, &actor);
        }

        let hints = merge_hints(&context.hints, &parse_encryption_hints(event));

        if event.is_gift_wrap() {
            self.resolve_gift_wrap(event, &actor, &hints).await
        } else {
            self.resolve_legacy(event, &actor, &hints).await
        }
    }

    async fn resolve_legacy(
        &self,
        event: &EncryptedEvent,
        actor: &str,
        hints: &EncryptionHints,
    ) -> DecryptResult {
        if event.content.is_empty() {
            return ErrorAggregator::input_failure(
                event,
                actor,
                Stage::Input,
                DecryptError::MissingInput {
                    what: "direct message",
                },
            );
        }

        let sender = normalize_hex(&event.pubkey);
        let recipients = collect_recipients(&event.tags);
        let actor_candidate = (!actor.is_empty()).then_some(actor);

        let Some(candidates) =
            CandidateKeyResolver.resolve(sender.as_deref(), &recipients, actor_candidate)
        else {
            debug!("no candidate keys for direct message");
            return ErrorAggregator::build_failure(Vec::new(), event, actor);
        };

        let decryptors = self.registry.ordered_for(hints);
        let attempts = AttemptOrchestrator::plan(&decryptors, candidates.keys(), Stage::Content);
        debug!(
            attempts = attempts.len(),
            candidates = candidates.len(),
            "racing direct message decryption"
        );

        let shared = Arc::new(event.clone());
        let outcome = self
            .orchestrator
            .race(attempts, |attempt| {
                let decryptor = Arc::clone(&attempt.decryptor);
                let key = attempt.candidate_key.clone();
                let event = Arc::clone(&shared);
                async move {
                    let context = DecryptContext {
                        event: Arc::clone(&event),
                        stage: Stage::Content,
                        remote_pubkey: key.clone(),
                    };
                    let bytes = decryptor
                        .decrypt(&key, &event.content, &context)
                        .await
                        .map_err(|cause| AttemptFailure::new(Stage::Content, cause))?;
                    String::from_utf8(bytes).map_err(|_| {
                        AttemptFailure::new(Stage::Content, DecryptError::InvalidPlaintext)
                    })
                }
            })
            .await;

        match outcome {
            RaceOutcome::Won { attempt, value } => ResultBuilder::build_success(Winning {
                event,
                message: event,
                plaintext: value,
                recipients,
                sender_pubkey: sender,
                actor_pubkey: actor,
                attempt: &attempt,
                hints,
                envelope: None,
            }),
            RaceOutcome::Exhausted(records) => ErrorAggregator::build_failure(records, event, actor),
        }
    }

    async fn resolve_gift_wrap(
        &self,
        event: &EncryptedEvent,
        actor: &str,
        hints: &EncryptionHints,
    ) -> DecryptResult {
        let wrap_pubkey = match normalize_hex(&event.pubkey) {
            Some(pubkey) if !event.content.is_empty() => pubkey,
            _ => {
                return ErrorAggregator::input_failure(
                    event,
                    actor,
                    Stage::Wrap,
                    DecryptError::MissingInput { what: "gift wrap" },
                );
            }
        };

        let decryptors = self.registry.gift_wrap_capable();
        if decryptors.is_empty() {
            warn!("no registered decryptor can unwrap gift wraps");
            return ErrorAggregator::build_failure(Vec::new(), event, actor);
        }

        let attempts = AttemptOrchestrator::plan(&decryptors, &[wrap_pubkey], Stage::Wrap);
        let shared = Arc::new(event.clone());
        let outcome = self
            .orchestrator
            .race(attempts, |attempt| {
                let decryptor = Arc::clone(&attempt.decryptor);
                let key = attempt.candidate_key.clone();
                let wrap = Arc::clone(&shared);
                async move { unwrap_gift(decryptor.as_ref(), &key, wrap).await }
            })
            .await;

        match outcome {
            RaceOutcome::Won { attempt, value } => {
                let Unwrapped { seal, rumor } = value;
                let sender = normalize_hex(&rumor.pubkey).or_else(|| normalize_hex(&seal.pubkey));
                let recipients = collect_recipients(&rumor.tags);
                let plaintext = rumor.content.clone();

                ResultBuilder::build_success(Winning {
                    event,
                    message: &rumor,
                    plaintext,
                    recipients,
                    sender_pubkey: sender,
                    actor_pubkey: actor,
                    attempt: &attempt,
                    hints,
                    envelope: Some(Envelope {
                        wrap: event.clone(),
                        seal,
                    }),
                })
            }
            RaceOutcome::Exhausted(records) => ErrorAggregator::build_failure(records, event, actor),
        }
    }
}

/// Peel wrap and seal with one adapter.
async fn unwrap_gift(
    decryptor: &dyn Decryptor,
    wrap_pubkey: &str,
    wrap: Arc<EncryptedEvent>,
) -> Result<Unwrapped, AttemptFailure> {
    let context = DecryptContext {
        event: Arc::clone(&wrap),
        stage: Stage::Wrap,
        remote_pubkey: wrap_pubkey.to_string(),
    };
    let sealed = decryptor
        .decrypt(wrap_pubkey, &wrap.content, &context)
        .await
        .map_err(|cause| AttemptFailure::new(Stage::Wrap, cause))?;
    let seal = parse_event_json(sealed, Stage::Wrap)?;

    let seal_pubkey = normalize_hex(&seal.pubkey)
        .filter(|_| !seal.content.is_empty())
        .ok_or_else(|| AttemptFailure::new(Stage::Seal, DecryptError::InvalidSeal))?;

    let seal = Arc::new(seal);
    let context = DecryptContext {
        event: Arc::clone(&seal),
        stage: Stage::Seal,
        remote_pubkey: seal_pubkey.clone(),
    };
    let rumor_bytes = decryptor
        .decrypt(&seal_pubkey, &seal.content, &context)
        .await
        .map_err(|cause| AttemptFailure::new(Stage::Seal, cause))?;
    let rumor = parse_event_json(rumor_bytes, Stage::Rumor)?;

    drop(context);
    let seal = Arc::try_unwrap(seal).unwrap_or_else(|shared| (*shared).clone());
    Ok(Unwrapped { seal, rumor })
}

fn parse_event_json(bytes: Vec<u8>, stage: Stage) -> Result<EncryptedEvent, AttemptFailure> {
    let text = String::from_utf8(bytes)
        .map_err(|_| AttemptFailure::new(stage, DecryptError::InvalidPlaintext))?;
    if text.trim().is_empty() {
        return Err(AttemptFailure::new(stage, DecryptError::EmptyPayload));
    }
    EncryptedEvent::from_json(&text).map_err(|e| {
        AttemptFailure::new(
            stage,
            DecryptError::InvalidJson {
                reason: e.to_string(),
            },
        )
    })
}
