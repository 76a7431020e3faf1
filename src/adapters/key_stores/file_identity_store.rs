use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use nostr::Keys;

use crate::core::errors::{DmError, Result};

/// File-based store for the local Nostr identity.
///
/// Format: comment lines starting with `#`, followed by the secret key
/// (hex or `nsec`) on its own line.
///
/// Example `identity.txt`:
/// ```text
/// # created: 2026-02-20T10:00:00Z
/// # public key: 79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798
/// 0000000000000000000000000000000000000000000000000000000000000001
/// ```
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Create a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default identity location for the current platform.
    ///
    /// - Linux: `~/.config/dmresolve/identity.txt`
    /// - macOS: `~/Library/Application Support/dmresolve/identity.txt`
    /// - Windows: `%APPDATA%/dmresolve/identity.txt`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| DmError::InvalidConfig {
            detail: "Could not determine config directory".into(),
        })?;
        Ok(config_dir.join("dmresolve").join("identity.txt"))
    }

    /// Return the file path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Generate a new identity, save it, and return its public key hex.
    ///
    /// Refuses to overwrite an existing identity unless `force` is set.
    pub fn generate(&self, force: bool) -> Result<String> {
        if self.exists() && !force {
            return Err(DmError::IdentityExists {
                path: self.path.clone(),
            });
        }

        let keys = Keys::generate();
        let public_key = keys.public_key().to_hex();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let contents = format!(
            "# created: {created}\n# public key: {public_key}\n{}\n",
            keys.secret_key().to_secret_hex()
        );
        let mut file = create_private(&self.path)?;
        file.write_all(contents.as_bytes())?;

        Ok(public_key)
    }

    /// Load the identity's keys.
    pub fn load(&self) -> Result<Keys> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DmError::IdentityNotFound {
                path: self.path.clone(),
            },
            _ => DmError::InvalidIdentity {
                path: self.path.clone(),
                detail: format!("cannot read identity file: {e}"),
            },
        })?;

        let secret = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .ok_or_else(|| DmError::InvalidIdentity {
                path: self.path.clone(),
                detail: "no secret key line found".into(),
            })?;

        Keys::parse(secret).map_err(|e| DmError::InvalidIdentity {
            path: self.path.clone(),
            detail: e.to_string(),
        })
    }

    /// Public key of the stored identity, as hex.
    pub fn read_public_key(&self) -> Result<String> {
        Ok(self.load()?.public_key().to_hex())
    }
}

/// Create (or truncate) a file readable only by its owner.
///
/// On Unix the mode is applied at creation. An existing file keeps its
/// old mode on truncation, so it is tightened before anything is written.
#[cfg(unix)]
fn create_private(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}
