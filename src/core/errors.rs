use std::path::PathBuf;

/// All application errors for dmresolve.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger. Ordinary decryption failure is never
/// one of these: it travels inside `DecryptResult::Failure`.
#[derive(Debug, thiserror::Error)]
pub enum DmError {
    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "Invalid event: {detail}\n\n  \
         Expected a Nostr event as JSON, e.g.\n    \
         {{\"id\": \"...\", \"pubkey\": \"<hex>\", \"kind\": 4, \"tags\": [], \"content\": \"...\"}}"
    )]
    InvalidEvent { detail: String },

    #[error(
        "Could not decrypt message {event_id} ({attempts} attempt(s) failed)\n\n  \
         None of the configured schemes recovered a plaintext with any candidate key.\n\n  \
         Solutions:\n    \
         → Check you are using the identity the message was sent to: dmresolve keys show\n    \
         → List the configured schemes: dmresolve schemes\n    \
         → Inspect the failure causes: dmresolve decrypt --json <file>"
    )]
    DecryptionFailed { event_id: String, attempts: usize },

    #[error(
        "No identity found at {path}\n\n  \
         Solutions:\n    \
         → New here? Run 'dmresolve keys generate' to create one\n    \
         → Have a key? Use --key <path> to specify the location"
    )]
    IdentityNotFound { path: PathBuf },

    #[error("Identity already exists at {path}. Use --force to overwrite it.")]
    IdentityExists { path: PathBuf },

    #[error("Invalid identity in {path}: {detail}")]
    InvalidIdentity { path: PathBuf, detail: String },

    #[error("Invalid public key '{key}': expected 64 hexadecimal characters")]
    InvalidPublicKey { key: String },

    #[error("Unknown decryption scheme '{scheme}'. Supported: nip44_v2, nip44, nip04")]
    UnknownScheme { scheme: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Diagnostics log error: {detail}")]
    DiagnosticsError { detail: String },

    #[error(
        "This project uses format version {project_version}, but your dmresolve \
         only supports up to version {supported_version}.\n\n  \
         Solution:\n    \
         → Install latest: cargo install dmresolve --force"
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DmError>;

/// Cause of one failed decryption attempt.
///
/// Recorded inside a `FailureRecord`; never fatal to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error("invalid public key '{pubkey}': {reason}")]
    InvalidPublicKey { pubkey: String, reason: String },

    #[error("{scheme} decryption failed: {reason}")]
    Cipher { scheme: String, reason: String },

    #[error("decrypted content was not a valid string")]
    InvalidPlaintext,

    #[error("decrypted payload was empty")]
    EmptyPayload,

    #[error("failed to parse decrypted payload as JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("gift wrap seal is missing ciphertext or pubkey")]
    InvalidSeal,

    #[error("{what} is missing ciphertext or pubkey")]
    MissingInput { what: &'static str },

    #[error("unsupported DM event kind {kind}")]
    UnsupportedKind { kind: u16 },

    #[error("decryptor panicked: {reason}")]
    Panicked { reason: String },
}
