//! cellvec CLI entry point.

use clap::Parser;

use cellvec::cli::{self, Cli, Commands};
use cellvec::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Plan(args) => cli::commands::plan::execute(args, &config, cli.json).await,
        Commands::Run(args) => cli::commands::run::execute(args, &config, cli.json).await,
        Commands::Config(command) => cli::commands::config::execute(&command, config, cli.json),
    };

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
