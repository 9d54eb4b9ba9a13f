use clap::Parser;

use depprobe_cli::cli::{Cli, Commands};
use depprobe_cli::commands;
use depprobe_cli::error::CliError;
use depprobe_cli::logging::init_tracing;
use depprobe_cli::output::OutputWriter;
use depprobe_core::config::{DepprobeConfig, GeneralConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            match e.payload() {
                Some(payload) => print!("{payload}"),
                None => eprintln!("{e}"),
            }
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // A broken config file still gets default logging; the command reports the error.
    let mut general = DepprobeConfig::load_or_default(&cli.config)
        .await
        .map(|c| c.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    init_tracing(&general)?;

    tracing::debug!(config = %cli.config.display(), "depprobe starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Test(args) => commands::test::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
