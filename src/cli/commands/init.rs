use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::app_config::{AppConfig, CONFIG_FILE};
use crate::core::errors::{DmError, Result};

/// Execute the `dmresolve init` command.
///
/// Creates the project directory and writes a default `config.toml`.
pub fn execute(ctx: &CliContext, verbose: bool) -> Result<()> {
    let dir = ctx.dir();
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() {
        return Err(DmError::InvalidConfig {
            detail: format!(
                "dmresolve is already initialized here ({} exists)",
                config_path.display()
            ),
        });
    }

    output::header("dmresolve: initializing project");

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}/", dir.display()));

    let config = AppConfig::default();
    std::fs::write(&config_path, config.to_toml()?)?;
    output::success(&format!("Generated {CONFIG_FILE} with defaults"));

    let store = ctx.identity_store(Some(&config))?;
    if store.exists() {
        output::success(&format!("Identity found at {}", store.path().display()));
    } else {
        output::warning("No identity found");
        println!("  Run 'dmresolve keys generate' to create one.");
    }

    output::success("Project ready.\n");

    if verbose {
        println!("  Files created:");
        println!("     {}   decryptors and race policy", config_path.display());
        println!("  The diagnostics log is created on the first decrypt.");
    }

    Ok(())
}
