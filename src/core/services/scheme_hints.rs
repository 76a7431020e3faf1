use std::sync::LazyLock;

use regex::Regex;

use crate::core::models::event::EncryptedEvent;
use crate::core::models::resolve_context::EncryptionHints;

static HEX64: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("static regex is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Map a raw scheme label to its canonical identifier.
///
/// Known aliases (`nip-44`, `NIP44-V2`, `nip-04`...) collapse onto
/// `nip44`, `nip44_v2` and `nip04`. Unknown labels are trimmed and
/// lowercased. Blank input has no match.
pub fn normalize_scheme(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "" => None,
        "nip44_v2" | "nip44-v2" => Some("nip44_v2".into()),
        "nip44" | "nip-44" => Some("nip44".into()),
        "nip04" | "nip-04" => Some("nip04".into()),
        _ => Some(normalized),
    }
}

/// Normalize a public key to lowercase 64-char hex, or `None`.
pub fn normalize_hex(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_lowercase();
    HEX64.is_match(&trimmed).then_some(trimmed)
}

/// Collect scheme hints from `["encrypted", "<scheme> <scheme>", ...]` tags.
///
/// A tag value may carry several whitespace-separated schemes.
/// Order of first appearance is kept; duplicates are dropped.
pub fn parse_encryption_hints(event: &EncryptedEvent) -> EncryptionHints {
    let mut algorithms: Vec<String> = Vec::new();

    for tag in event.tags_named("encrypted") {
        for value in tag.iter().skip(1) {
            for part in WHITESPACE.split(value.trim()) {
                if let Some(scheme) = normalize_scheme(part)
                    && !algorithms.contains(&scheme)
                {
                    algorithms.push(scheme);
                }
            }
        }
    }

    EncryptionHints { algorithms }
}

/// Merge caller hints ahead of hints declared by the event.
pub fn merge_hints(caller: &EncryptionHints, declared: &EncryptionHints) -> EncryptionHints {
    let mut algorithms: Vec<String> = Vec::new();

    for raw in caller.algorithms.iter().chain(&declared.algorithms) {
        if let Some(scheme) = normalize_scheme(raw)
            && !algorithms.contains(&scheme)
        {
            algorithms.push(scheme);
        }
    }

    EncryptionHints { algorithms }
}
