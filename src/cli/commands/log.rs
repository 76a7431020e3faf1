use colored::Colorize;

use crate::adapters::diagnostics::json_diagnostics_log::JsonDiagnosticsLog;
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{DmError, Result};
use crate::core::models::resolution_entry::ResolutionEntry;
use crate::core::traits::diagnostics::DiagnosticsLog;

/// Execute the `dmresolve log` command.
pub fn execute(ctx: &CliContext, last: Option<usize>, failures_only: bool) -> Result<()> {
    let dir = ctx.dir();
    if !dir.exists() {
        return Err(DmError::InvalidConfig {
            detail: format!(
                "{} not found. Run 'dmresolve init' first.",
                dir.display()
            ),
        });
    }

    let config = AppConfig::load_or_default(dir)?;
    let log = JsonDiagnosticsLog::from_config(dir, config.diagnostics.as_ref());
    let entries = log.query(failures_only)?;

    if entries.is_empty() {
        output::header("dmresolve log");
        output::warning("No resolutions recorded");
        if failures_only {
            println!("  Try without --failures to see all entries.");
        }
        return Ok(());
    }

    // Apply --last N (take from the end)
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    let display = &entries[skip..];

    output::header(&format!("dmresolve log ({} entries)", display.len()));
    println!();

    for entry in display {
        print_entry(entry);
    }

    Ok(())
}

fn print_entry(entry: &ResolutionEntry) {
    let date = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let status = if entry.ok {
        "ok".green().to_string()
    } else {
        "failed".red().to_string()
    };
    let scheme = entry.scheme.as_deref().unwrap_or("-");

    println!(
        "  {} {} {:<6} kind {:<5} {:<10} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        status,
        entry.kind,
        scheme,
        short_id(&entry.event_id).dimmed(),
    );

    for failure in &entry.failures {
        let key = failure.candidate_key.as_deref().map(short_id).unwrap_or("-");
        output::detail(&format!(
            "{}/{} [{}] key {}: {}",
            failure.scheme, failure.source, failure.stage, key, failure.cause
        ));
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
