use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::app_config::DiagnosticsSection;
use crate::core::errors::{DmError, Result};
use crate::core::models::resolution_entry::ResolutionEntry;
use crate::core::traits::diagnostics::DiagnosticsLog;

/// Diagnostics log that appends one JSON object per line.
///
/// Each line is a self-contained `ResolutionEntry`, so appends stay
/// cheap and reads can stream the file line by line.
pub struct JsonDiagnosticsLog {
    log_path: PathBuf,
}

impl JsonDiagnosticsLog {
    /// Create a log that writes to `{project_dir}/{log_file}`.
    pub fn new(project_dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: project_dir.join(log_file),
        }
    }

    /// Create a log from the `[diagnostics]` section, falling back to
    /// `resolutions.log` when the section is missing.
    pub fn from_config(project_dir: &Path, section: Option<&DiagnosticsSection>) -> Self {
        let log_file = section
            .map(|d| d.log_file.as_str())
            .unwrap_or("resolutions.log");
        Self::new(project_dir, log_file)
    }

    /// Returns `true` when the section is absent (enabled by default).
    pub fn is_enabled(section: Option<&DiagnosticsSection>) -> bool {
        section.map(|d| d.enabled).unwrap_or(true)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl DiagnosticsLog for JsonDiagnosticsLog {
    fn record(&self, entry: &ResolutionEntry) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(|e| DmError::DiagnosticsError {
            detail: format!("Failed to serialize resolution entry: {e}"),
        })?;

        if let Some(parent) = self.log_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| DmError::DiagnosticsError {
                detail: format!(
                    "Cannot open diagnostics log at {}: {e}",
                    self.log_path.display()
                ),
            })?;

        writeln!(file, "{line}").map_err(|e| DmError::DiagnosticsError {
            detail: format!("Failed to write resolution entry: {e}"),
        })?;

        Ok(())
    }

    fn query(&self, failures_only: bool) -> Result<Vec<ResolutionEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| DmError::DiagnosticsError {
            detail: format!("Cannot read diagnostics log: {e}"),
        })?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| DmError::DiagnosticsError {
                detail: format!("Error reading diagnostics log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let entry: ResolutionEntry =
                serde_json::from_str(trimmed).map_err(|e| DmError::DiagnosticsError {
                    detail: format!("Malformed resolution entry at line {}: {e}", line_num + 1),
                })?;

            if failures_only && entry.ok {
                continue;
            }

            entries.push(entry);
        }

        Ok(entries)
    }
}
