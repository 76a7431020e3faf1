use std::path::{Path, PathBuf};

use crate::adapters::key_stores::file_identity_store::FileIdentityStore;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;

/// Paths shared by every command, taken from the global flags.
#[derive(Debug, Clone)]
pub struct CliContext {
    dir: PathBuf,
    key: Option<PathBuf>,
}

impl CliContext {
    pub fn new(dir: PathBuf, key: Option<PathBuf>) -> Self {
        Self { dir, key }
    }

    /// Project directory (default `.dmresolve`).
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Identity store to use: `--key`, then `key_file` from the config,
    /// then the platform default.
    pub fn identity_store(&self, config: Option<&AppConfig>) -> Result<FileIdentityStore> {
        if let Some(path) = &self.key {
            return Ok(FileIdentityStore::new(path.clone()));
        }
        if let Some(path) = config.and_then(|c| c.resolver.key_file.as_ref()) {
            return Ok(FileIdentityStore::new(PathBuf::from(path)));
        }
        Ok(FileIdentityStore::new(FileIdentityStore::default_path()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_flag_wins_over_config() {
        let mut config = AppConfig::default();
        config.resolver.key_file = Some("/from/config.txt".into());
        let ctx = CliContext::new(".dmresolve".into(), Some("/from/flag.txt".into()));

        let store = ctx.identity_store(Some(&config)).unwrap();

        assert_eq!(store.path(), Path::new("/from/flag.txt"));
    }

    #[test]
    fn config_key_file_used_without_flag() {
        let mut config = AppConfig::default();
        config.resolver.key_file = Some("/from/config.txt".into());
        let ctx = CliContext::new(".dmresolve".into(), None);

        let store = ctx.identity_store(Some(&config)).unwrap();

        assert_eq!(store.path(), Path::new("/from/config.txt"));
    }
}
