use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use dmresolve::cli::context::CliContext;
use dmresolve::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();

    let default_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::new(args.dir.clone(), args.key.clone());

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(&ctx, args.verbose),
        Commands::Keys { action } => cli::commands::keys::execute(&ctx, action),
        Commands::Schemes => cli::commands::schemes::execute(&ctx),
        Commands::Decrypt {
            file,
            actor,
            hints,
            json,
        } => cli::commands::decrypt::execute(&ctx, file, actor.as_deref(), hints, *json),
        Commands::Log { last, failures } => cli::commands::log::execute(&ctx, *last, *failures),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
