use std::io::Read;
use std::path::PathBuf;

use colored::Colorize;

use super::diagnostics_helpers::record_resolution;
use super::registry_helpers::build_registry;
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{DmError, Result};
use crate::core::models::decrypt_result::{
    DecryptFailure, DecryptResult, DecryptSuccess, Direction,
};
use crate::core::models::event::EncryptedEvent;
use crate::core::models::resolve_context::ResolveContext;
use crate::core::services::dm_resolver::DmResolver;
use crate::core::services::scheme_hints::normalize_hex;

/// Execute the `dmresolve decrypt` command.
///
/// Reads one event as JSON from `file` (or stdin for `-`), resolves it
/// with every configured scheme, and prints the outcome. A message
/// nobody could decrypt is an error, so the exit code reflects it.
pub fn execute(
    ctx: &CliContext,
    file: &str,
    actor: Option<&str>,
    hints: &[String],
    json: bool,
) -> Result<()> {
    let config = AppConfig::load_or_default(ctx.dir())?;
    let keys = ctx.identity_store(Some(&config))?.load()?;

    let raw = read_input(file)?;
    let event = EncryptedEvent::from_json(&raw).map_err(|e| DmError::InvalidEvent {
        detail: e.to_string(),
    })?;

    let actor = match actor {
        Some(raw) => normalize_hex(raw).ok_or_else(|| DmError::InvalidPublicKey {
            key: raw.to_string(),
        })?,
        None => keys.public_key().to_hex(),
    };

    let registry = build_registry(&config, &keys)?;
    let resolver = DmResolver::new(registry, config.resolver.race_policy);
    let context = ResolveContext::for_actor(actor).with_hints(hints.iter().cloned());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(resolver.resolve(&event, &context));

    record_resolution(ctx.dir(), &config, &result);

    if json {
        let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        match &result {
            DecryptResult::Success(success) => print_success(success),
            DecryptResult::Failure(failure) => print_failure(failure),
        }
    }

    match result {
        DecryptResult::Success(_) => Ok(()),
        DecryptResult::Failure(failure) => Err(DmError::DecryptionFailed {
            event_id: failure.event.id,
            attempts: failure.errors.len(),
        }),
    }
}

/// Read the event text from a file, or from stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    let path = PathBuf::from(file);
    if !path.exists() {
        return Err(DmError::FileNotFound { path });
    }
    Ok(std::fs::read_to_string(&path)?)
}

fn print_success(success: &DecryptSuccess) {
    output::header(&format!("Decrypted message {}", success.event.id));
    output::detail(&format!(
        "Scheme: {} (via {}/{})",
        success.scheme, success.decryptor.scheme, success.decryptor.source
    ));
    output::detail(&format!("Counterparty: {}", success.remote_pubkey));
    let direction = match success.direction {
        Direction::Incoming => "incoming",
        Direction::Outgoing => "outgoing",
        Direction::Unknown => "unknown",
    };
    output::detail(&format!("Direction: {direction}"));
    if success.envelope.is_some() {
        output::detail("Unwrapped from gift wrap");
    }
    println!();
    println!("{}", success.plaintext);
}

fn print_failure(failure: &DecryptFailure) {
    output::header(&format!("Could not decrypt message {}", failure.event.id));
    if failure.errors.is_empty() {
        output::warning("No decryptor or candidate key was available to try");
        return;
    }
    for record in &failure.errors {
        let key = record.candidate_key.as_deref().unwrap_or("-");
        println!(
            "  {} {}/{} [{}] key {}: {}",
            "✗".red(),
            record.scheme,
            record.source,
            record.stage,
            key.dimmed(),
            record.cause
        );
    }
}
