use crate::cli::KeysAction;
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;

/// Execute the `dmresolve keys` command.
pub fn execute(ctx: &CliContext, action: &KeysAction) -> Result<()> {
    let config = AppConfig::load_or_default(ctx.dir())?;
    let store = ctx.identity_store(Some(&config))?;

    match action {
        KeysAction::Generate { force } => {
            let public_key = store.generate(*force)?;
            output::success(&format!("Identity saved to {}", store.path().display()));
            output::success(&format!("Public key: {public_key}"));
            println!("\n  Keep the identity file private. The public key is safe to share.");
        }
        KeysAction::Show => {
            let public_key = store.read_public_key()?;
            println!("{public_key}");
        }
    }

    Ok(())
}
