//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file commands
//! - `inspect` - Zone listing and cursor probing against a display layout
//! - `run` - The background service

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, LoadedConfig};
use crate::error::EdgeHopError;

pub mod config_cmd;
pub mod inspect;
pub mod run;

pub use config_cmd::ConfigCommands;
pub use inspect::{ProbeArgs, ZonesArgs};

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Edgehop CLI - multi-monitor cursor edge jumping.
#[derive(Parser, Debug)]
#[command(name = "edgehop")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the edge-jump service.
    ///
    /// Polls the cursor and warps it between displays until interrupted.
    /// This is what `edgehop` does when called without arguments.
    Run,

    /// List displays and their compiled jump zones.
    ///
    /// Uses the current displays, or the arrangement in a layout file.
    Zones(ZonesArgs),

    /// Show how a cursor sample would be scored.
    ///
    /// Prints every candidate zone with its score breakdown and the final
    /// decision, without moving the cursor.
    Probe(ProbeArgs),

    /// Configuration file management commands.
    ///
    /// Initialize, view, and locate the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Edgehop configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(edgehop completions --shell zsh)"
    ///   edgehop completions --shell fish > ~/.config/fish/completions/edgehop.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// A CLI that runs the service with default options.
    #[must_use]
    pub const fn run_service() -> Self { Self { config: None, verbose: 0, command: Commands::Run } }

    /// Loads the configuration named by `--config`, or the default one.
    fn load_config(&self) -> Result<LoadedConfig, EdgeHopError> {
        Ok(config::load_existing(self.config.as_deref())?)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), EdgeHopError> {
        crate::logging::init(self.verbose);

        match &self.command {
            Commands::Run => {
                let loaded = config::load(self.config.as_deref())?;
                run::execute(&loaded)
            }
            Commands::Zones(args) => inspect::zones(args, &self.load_config()?.config),
            Commands::Probe(args) => inspect::probe(args, &self.load_config()?.config),
            Commands::Config(cmd) => config_cmd::execute(cmd, self.config.as_deref()),
            Commands::Schema => {
                println!("{}", config::generate_schema_json());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "edgehop", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() { Cli::command().debug_assert(); }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["edgehop", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_verbosity_anywhere() {
        let cli = Cli::try_parse_from(["edgehop", "zones", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_parses_global_config() {
        let cli = Cli::try_parse_from(["edgehop", "schema", "--config", "/tmp/e.jsonc"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/e.jsonc")));
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_zones() {
        let cli =
            Cli::try_parse_from(["edgehop", "zones", "--layout", "desk.jsonc", "--json"]).unwrap();
        match cli.command {
            Commands::Zones(args) => {
                assert_eq!(args.layout, Some(PathBuf::from("desk.jsonc")));
                assert!(args.json);
            }
            _ => panic!("Expected Zones command"),
        }
    }

    #[test]
    fn test_cli_parses_probe() {
        let cli = Cli::try_parse_from([
            "edgehop", "probe", "--layout", "desk.jsonc", "--x", "1918", "--y", "520", "--dy=-20",
        ])
        .unwrap();
        match cli.command {
            Commands::Probe(args) => {
                assert_eq!(args.x, 1918.0);
                assert_eq!(args.y, 520.0);
                assert_eq!(args.dx, 0.0);
                assert_eq!(args.dy, -20.0);
            }
            _ => panic!("Expected Probe command"),
        }
    }

    #[test]
    fn test_cli_probe_requires_position() {
        assert!(Cli::try_parse_from(["edgehop", "probe", "--layout", "desk.jsonc"]).is_err());
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["edgehop", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_config_init() {
        let cli = Cli::try_parse_from(["edgehop", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init { force, path, stdout }) => {
                assert!(force);
                assert!(path.is_none());
                assert!(!stdout);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_run_service_cli() {
        assert!(matches!(Cli::run_service().command, Commands::Run));
    }
}
