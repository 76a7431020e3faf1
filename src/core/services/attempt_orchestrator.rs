use std::any::Any;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::errors::DecryptError;
use crate::core::models::decrypt_result::{FailureRecord, Stage};
use crate::core::services::error_aggregator::ErrorAggregator;
use crate::core::services::scheme_registry::canonical_scheme;
use crate::core::traits::decryptor::Decryptor;

/// How the orchestrator picks a winner among concurrent successes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// The first success to complete wins, whatever its rank.
    #[default]
    FirstCompleted,
    /// A success wins only once every lower-ranked attempt has failed.
    PriorityStable,
}

impl std::fmt::Display for RacePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RacePolicy::FirstCompleted => f.write_str("first_completed"),
            RacePolicy::PriorityStable => f.write_str("priority_stable"),
        }
    }
}

/// One (adapter, candidate key) pairing.
#[derive(Clone)]
pub struct Attempt {
    /// Position in the cross-product; lower is preferred.
    pub rank: usize,
    pub decryptor: Arc<dyn Decryptor>,
    pub candidate_key: String,
    /// Stage the attempt starts in.
    pub stage: Stage,
}

impl Attempt {
    fn failure_record(&self, failure: AttemptFailure) -> FailureRecord {
        FailureRecord {
            scheme: canonical_scheme(self.decryptor.as_ref()),
            source: self.decryptor.source().to_string(),
            stage: failure.stage,
            candidate_key: Some(self.candidate_key.clone()),
            cause: failure.cause,
        }
    }
}

impl std::fmt::Debug for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attempt")
            .field("rank", &self.rank)
            .field("scheme", &self.decryptor.scheme())
            .field("source", &self.decryptor.source())
            .field("candidate_key", &self.candidate_key)
            .field("stage", &self.stage)
            .finish()
    }
}

/// Why an attempt failed, and at which stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub stage: Stage,
    pub cause: DecryptError,
}

impl AttemptFailure {
    pub fn new(stage: Stage, cause: DecryptError) -> Self {
        Self { stage, cause }
    }
}

/// Result of a race.
#[derive(Debug)]
pub enum RaceOutcome<T> {
    Won { attempt: Attempt, value: T },
    /// Every attempt failed; records are in completion order.
    Exhausted(Vec<FailureRecord>),
}

/// Runs every attempt concurrently and resolves to at most one winner.
///
/// Each attempt runs on its own task. Once a winner is reported, the
/// remaining tasks are left to finish on their own: nothing cancels
/// them, and whatever they produce is dropped with the channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptOrchestrator {
    policy: RacePolicy,
}

impl AttemptOrchestrator {
    pub fn new(policy: RacePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    /// Cross-product of adapters and keys: adapters outer, keys inner.
    pub fn plan(
        decryptors: &[Arc<dyn Decryptor>],
        keys: &[String],
        stage: Stage,
    ) -> Vec<Attempt> {
        decryptors
            .iter()
            .flat_map(|decryptor| keys.iter().map(move |key| (decryptor, key)))
            .enumerate()
            .map(|(rank, (decryptor, key))| Attempt {
                rank,
                decryptor: Arc::clone(decryptor),
                candidate_key: key.clone(),
                stage,
            })
            .collect()
    }

    /// Launch `run` for every attempt and wait for a winner or exhaustion.
    ///
    /// Must be called within a tokio runtime. With no attempts, returns
    /// `Exhausted` immediately without spawning anything.
    pub async fn race<T, F, Fut>(&self, mut attempts: Vec<Attempt>, run: F) -> RaceOutcome<T>
    where
        T: Send + 'static,
        F: Fn(&Attempt) -> Fut,
        Fut: Future<Output = Result<T, AttemptFailure>> + Send + 'static,
    {
        let total = attempts.len();
        if total == 0 {
            return RaceOutcome::Exhausted(Vec::new());
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<T, AttemptFailure>)>();

        for (index, attempt) in attempts.iter().enumerate() {
            let work = run(attempt);
            let stage = attempt.stage;
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(AttemptFailure::new(
                        stage,
                        DecryptError::Panicked {
                            reason: panic_message(panic.as_ref()),
                        },
                    )),
                };
                // Fails only when the race is already decided.
                let _ = tx.send((index, outcome));
            });
        }
        drop(tx);

        let mut errors = ErrorAggregator::new();
        let mut failed = vec![false; total];
        let mut pending: BTreeMap<usize, T> = BTreeMap::new();
        let mut next = 0;
        let mut settled = 0;

        while let Some((index, outcome)) = rx.recv().await {
            settled += 1;
            match outcome {
                Ok(value) if self.policy == RacePolicy::FirstCompleted => {
                    return self.finish(attempts.swap_remove(index), value, total - settled);
                }
                Ok(value) => {
                    pending.insert(index, value);
                }
                Err(failure) => {
                    let record = attempts[index].failure_record(failure);
                    debug!(
                        scheme = %record.scheme,
                        source = %record.source,
                        stage = %record.stage,
                        candidate_key = record.candidate_key.as_deref().unwrap_or(""),
                        error = %record.cause,
                        "decryption attempt failed"
                    );
                    errors.push(record);
                    failed[index] = true;
                }
            }

            while next < total {
                if let Some(value) = pending.remove(&next) {
                    return self.finish(attempts.swap_remove(next), value, total - settled);
                }
                if !failed[next] {
                    break;
                }
                next += 1;
            }
        }

        // Every task reports exactly once, so this only triggers if a
        // task was dropped by a shutting-down runtime.
        if let Some((index, value)) = pending.pop_first() {
            return self.finish(attempts.swap_remove(index), value, 0);
        }

        debug!(attempts = total, "all decryption attempts failed");
        RaceOutcome::Exhausted(errors.into_records())
    }

    fn finish<T>(&self, attempt: Attempt, value: T, abandoned: usize) -> RaceOutcome<T> {
        debug!(
            scheme = attempt.decryptor.scheme(),
            source = attempt.decryptor.source(),
            candidate_key = %attempt.candidate_key,
            rank = attempt.rank,
            abandoned,
            policy = %self.policy,
            "decryption attempt won"
        );
        RaceOutcome::Won { attempt, value }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
