//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::plan::PlanArgs;
use super::commands::run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "cellvec")]
#[command(about = "Batch embeddings for flat content and semantic cell trees", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .cellvec/config.yaml and .cellvec/local.yaml)
    #[arg(short, long, global = true, env = "CELLVEC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a request would be batched without calling a provider
    Plan(PlanArgs),

    /// Run a request through the engine with the null provider
    Run(RunArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Print as YAML, ready to save as .cellvec/config.yaml
        #[arg(long)]
        yaml: bool,
    },

    /// Validate the effective configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_output() {
        let cli = Cli::try_parse_from([
            "cellvec", "--json", "run", "request.json", "--output", "out.json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.request, PathBuf::from("request.json"));
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show_yaml() {
        let cli = Cli::try_parse_from(["cellvec", "config", "show", "--yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show { yaml: true })));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["cellvec", "config", "validate"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Validate)));
    }
}
