use std::path::Path;

use crate::adapters::diagnostics::json_diagnostics_log::JsonDiagnosticsLog;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::models::decrypt_result::DecryptResult;
use crate::core::models::resolution_entry::ResolutionEntry;
use crate::core::traits::diagnostics::DiagnosticsLog;

/// Append a resolution to the diagnostics log. Warns on failure instead
/// of propagating the error, since diagnostics never block a decrypt.
///
/// Nothing is recorded outside an initialized project.
pub fn record_resolution(project_dir: &Path, config: &AppConfig, result: &DecryptResult) {
    if !project_dir.exists() {
        return;
    }

    let section = config.diagnostics.as_ref();
    if !JsonDiagnosticsLog::is_enabled(section) {
        return;
    }

    let log = JsonDiagnosticsLog::from_config(project_dir, section);
    if let Err(e) = log.record(&ResolutionEntry::from_result(result)) {
        output::warning(&format!("Could not write diagnostics log: {e}"));
    }
}
