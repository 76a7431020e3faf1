use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::errors::{DmError, Result};
use crate::core::services::attempt_orchestrator::RacePolicy;
use crate::core::services::scheme_hints::normalize_scheme;

/// Schemes the bundled adapters can serve.
pub const SUPPORTED_SCHEMES: &[&str] = &["nip44_v2", "nip44", "nip04"];

/// Current format version supported by this build of dmresolve.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Name of the configuration file inside the project directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration read from `.dmresolve/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub resolver: ResolverSection,
    #[serde(default = "default_decryptors")]
    pub decryptors: Vec<DecryptorEntry>,
    pub diagnostics: Option<DiagnosticsSection>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverSection::default(),
            decryptors: default_decryptors(),
            diagnostics: Some(DiagnosticsSection::default()),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `<dir>/config.toml`.
    ///
    /// After parsing, validates decryptor schemes and the diagnostics
    /// log filename to prevent path traversal from a tampered config.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(DmError::InvalidConfig {
                detail: format!(
                    "{} not found. Run 'dmresolve init' first.",
                    config_path.display()
                ),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Like `load`, but falls back to built-in defaults when the
    /// project has no configuration file.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        if dir.join(CONFIG_FILE).exists() {
            Self::load(dir)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| DmError::InvalidConfig {
            detail: format!("Failed to parse {CONFIG_FILE}: {e}"),
        })?;

        // Check format version compatibility
        if config.resolver.format_version > CURRENT_FORMAT_VERSION {
            return Err(DmError::FormatVersionTooNew {
                project_version: config.resolver.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        for entry in &config.decryptors {
            let scheme = normalize_scheme(&entry.scheme).unwrap_or_default();
            if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
                return Err(DmError::UnknownScheme {
                    scheme: entry.scheme.clone(),
                });
            }
            if entry.source.trim().is_empty() {
                return Err(DmError::InvalidConfig {
                    detail: format!("Decryptor '{}' has an empty source", entry.scheme),
                });
            }
        }

        if let Some(diagnostics) = &config.diagnostics {
            validate_simple_filename(&diagnostics.log_file, "diagnostics log file")?;
        }

        Ok(config)
    }

    /// Render the configuration as TOML, for `dmresolve init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DmError::InvalidConfig {
            detail: format!("Failed to serialize configuration: {e}"),
        })
    }
}

/// The `[resolver]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSection {
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default)]
    pub race_policy: RacePolicy,
    /// Identity file; overrides the platform default.
    pub key_file: Option<String>,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            race_policy: RacePolicy::default(),
            key_file: None,
        }
    }
}

fn default_format_version() -> u32 {
    1
}

/// A `[[decryptors]]` entry, in preference order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptorEntry {
    pub scheme: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub priority: i32,
}

fn default_source() -> String {
    "local".to_string()
}

fn default_decryptors() -> Vec<DecryptorEntry> {
    ["nip44_v2", "nip04"]
        .into_iter()
        .map(|scheme| DecryptorEntry {
            scheme: scheme.to_string(),
            source: default_source(),
            priority: 0,
        })
        .collect()
}

/// The `[diagnostics]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSection {
    pub enabled: bool,
    pub log_file: String,
}

impl Default for DiagnosticsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: "resolutions.log".to_string(),
        }
    }
}

/// Validate that a value is a simple filename (no path separators).
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0')
    {
        return Err(DmError::InvalidConfig {
            detail: format!("Invalid {what}: '{name}'. Must be a simple filename."),
        });
    }
    Ok(())
}
