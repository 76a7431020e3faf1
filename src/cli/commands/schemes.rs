use colored::Colorize;

use super::registry_helpers::build_registry;
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::models::resolve_context::EncryptionHints;
use crate::core::services::dm_resolver::DmResolver;

/// Execute the `dmresolve schemes` command.
///
/// Lists the decryptors in the order they are tried when a message
/// carries no hints.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let config = AppConfig::load_or_default(ctx.dir())?;
    let keys = ctx.identity_store(Some(&config))?.load()?;
    let resolver = DmResolver::new(build_registry(&config, &keys)?, config.resolver.race_policy);
    let registry = resolver.registry();

    output::header(&format!(
        "dmresolve schemes ({} registered, race policy: {})",
        registry.len(),
        resolver.policy()
    ));
    println!();

    for (rank, decryptor) in registry
        .ordered_for(&EncryptionHints::default())
        .iter()
        .enumerate()
    {
        let gift_wrap = if decryptor.supports_gift_wrap() {
            "gift wrap".green().to_string()
        } else {
            "legacy only".dimmed().to_string()
        };
        println!(
            "  {} {} {:<10} {:<10} priority {:<4} {}",
            (rank + 1).to_string().dimmed(),
            "│".dimmed(),
            decryptor.scheme(),
            decryptor.source(),
            decryptor.priority(),
            gift_wrap,
        );
    }

    Ok(())
}
