/// Scheme hints for one resolution, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionHints {
    pub algorithms: Vec<String>,
}

impl EncryptionHints {
    pub fn new(algorithms: Vec<String>) -> Self {
        Self { algorithms }
    }

    /// Position of `scheme` in the hint list, if present.
    pub fn rank_of(&self, scheme: &str) -> Option<usize> {
        self.algorithms.iter().position(|a| a == scheme)
    }
}

/// Caller-supplied context for a resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// Identity the caller acts as; may be a delegated account.
    pub actor_pubkey: Option<String>,
    pub hints: EncryptionHints,
}

impl ResolveContext {
    pub fn for_actor(actor_pubkey: impl Into<String>) -> Self {
        Self {
            actor_pubkey: Some(actor_pubkey.into()),
            hints: EncryptionHints::default(),
        }
    }

    pub fn with_hints<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = EncryptionHints::new(algorithms.into_iter().map(Into::into).collect());
        self
    }
}
