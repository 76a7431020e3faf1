use std::sync::Arc;

use crate::core::models::resolve_context::EncryptionHints;
use crate::core::services::scheme_hints::normalize_scheme;
use crate::core::traits::decryptor::Decryptor;

/// Ordered set of decryptor adapters, in the caller's preference order.
///
/// Built once at configuration time and shared read-only by every
/// resolution. Cloning is cheap: adapters are reference counted.
#[derive(Clone, Default)]
pub struct SchemeRegistry {
    decryptors: Vec<Arc<dyn Decryptor>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter after the ones already registered.
    pub fn register(mut self, decryptor: Arc<dyn Decryptor>) -> Self {
        self.decryptors.push(decryptor);
        self
    }

    pub fn len(&self) -> usize {
        self.decryptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decryptors.is_empty()
    }

    /// Adapters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Decryptor>> {
        self.decryptors.iter()
    }

    /// Adapters in effective order for a message carrying `hints`.
    ///
    /// Sorted by priority, then hinted schemes by their position in the
    /// hints, then unhinted schemes by base rank. The sort is stable, so
    /// registration order breaks ties.
    pub fn ordered_for(&self, hints: &EncryptionHints) -> Vec<Arc<dyn Decryptor>> {
        let mut ordered = self.decryptors.clone();
        ordered.sort_by_key(|d| {
            let scheme = canonical_scheme(d.as_ref());
            (d.priority(), desired_rank(&scheme, hints))
        });
        ordered
    }

    /// Adapters able to unwrap gift wraps, most preferred first.
    pub fn gift_wrap_capable(&self) -> Vec<Arc<dyn Decryptor>> {
        self.ordered_for(&EncryptionHints::default())
            .into_iter()
            .filter(|d| d.supports_gift_wrap())
            .collect()
    }
}

impl std::fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.decryptors
                    .iter()
                    .map(|d| format!("{}/{}", d.scheme(), d.source())),
            )
            .finish()
    }
}

/// Normalized scheme label of an adapter, or its raw label when blank.
pub fn canonical_scheme(decryptor: &dyn Decryptor) -> String {
    normalize_scheme(decryptor.scheme()).unwrap_or_else(|| decryptor.scheme().to_string())
}

fn base_rank(scheme: &str) -> usize {
    match scheme {
        "nip44_v2" | "nip44" => 0,
        "nip04" => 5,
        _ => 10,
    }
}

/// Hinted schemes sort before every unhinted one.
fn desired_rank(scheme: &str, hints: &EncryptionHints) -> (u8, usize) {
    match hint_rank(scheme, hints) {
        Some(rank) => (0, rank),
        None => (1, base_rank(scheme)),
    }
}

fn hint_rank(scheme: &str, hints: &EncryptionHints) -> Option<usize> {
    // Both nip44 labels name the same construction.
    let sibling = match scheme {
        "nip44" => Some("nip44_v2"),
        "nip44_v2" => Some("nip44"),
        _ => None,
    };
    let own = hints.rank_of(scheme);
    let shared = sibling.and_then(|s| hints.rank_of(s));
    match (own, shared) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
