use serde::{Deserialize, Serialize};

/// Kind of a legacy (NIP-04 style) direct message.
pub const LEGACY_DM_KIND: u16 = 4;

/// Kind of a gift-wrapped message (NIP-59).
pub const GIFT_WRAP_KIND: u16 = 1059;

/// An encrypted Nostr event under resolution.
///
/// Deserialized from the event JSON as received; fields the resolver
/// doesn't need (`id`, `sig`) are optional so seals and rumors, which
/// are unsigned or partial, parse with the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    pub kind: u16,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl EncryptedEvent {
    /// Parse an event from its JSON representation.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns a copy of this event with `content` replaced.
    ///
    /// The original is left untouched.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    pub fn is_gift_wrap(&self) -> bool {
        self.kind == GIFT_WRAP_KIND
    }

    /// Iterates over tags whose first element equals `name`.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a [String]> {
        self.tags
            .iter()
            .filter(move |tag| tag.first().is_some_and(|t| t == name))
            .map(|tag| tag.as_slice())
    }
}
