pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Decrypt Nostr direct messages, whatever scheme they were sent with.
#[derive(Parser, Debug)]
#[command(name = "dmresolve", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory holding config.toml and the diagnostics log
    #[arg(long, global = true, default_value = ".dmresolve")]
    pub dir: PathBuf,

    /// Path to the identity file (secret key)
    #[arg(long, global = true, env = "DMRESOLVE_KEY")]
    pub key: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project directory with a default config.toml
    Init,

    /// Manage the local identity
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// List configured decryptors in effective order
    Schemes,

    /// Decrypt a direct message event (JSON file, or '-' for stdin)
    Decrypt {
        /// Event file
        file: String,
        /// Act as this public key instead of the local identity
        #[arg(long)]
        actor: Option<String>,
        /// Preferred scheme; repeat to give several, most preferred first
        #[arg(long = "hint")]
        hints: Vec<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the diagnostics log
    Log {
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
        /// Only show failed resolutions
        #[arg(long)]
        failures: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Generate a new identity
    Generate {
        /// Overwrite an existing identity
        #[arg(long)]
        force: bool,
    },
    /// Print the public key of the identity
    Show,
}
