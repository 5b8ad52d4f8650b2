use anyhow::Result;
use clap::Parser;
use pqtool::{Cli, Commands, commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    match cli.command {
        Commands::Files(command) => commands::files::run(command)?,
        Commands::Schema(command) => commands::schema::run(command)?,
        Commands::Fields(command) => commands::fields::run(command)?,
        Commands::Describe(command) => commands::describe::run(command)?,
        Commands::Catalog(command) => commands::catalog::run(command)?,
        Commands::Completions { shell } => Commands::generate_completions(shell),
    }
    Ok(())
}
