use serde::{Deserialize, Serialize};

/// Role a participant plays in a direct message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sender,
    Recipient,
}

/// A participant of a direct message, identified by a normalized hex key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub pubkey: String,
    pub relay_hints: Vec<String>,
    pub role: Role,
}

impl Recipient {
    pub fn sender(pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
            relay_hints: Vec::new(),
            role: Role::Sender,
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.relay_hints.as_slice() {
            [] => write!(f, "{}", self.pubkey),
            hints => write!(f, "{} ({})", self.pubkey, hints.join(", ")),
        }
    }
}
