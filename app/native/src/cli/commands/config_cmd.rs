//! Config CLI commands.
//!
//! Commands for managing the Edgehop configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{config_paths, load_existing};
use crate::error::EdgeHopError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  edgehop config init              # Create config at default location
  edgehop config init --force      # Overwrite existing config
  edgehop config init --path ~/my-config.jsonc  # Create at custom path
  edgehop config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/edgehop/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where Edgehop looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,

    /// Show the effective configuration.
    ///
    /// Prints the loaded configuration with defaults filled in, as JSON.
    Show,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, custom_path: Option<&Path>) -> Result<(), EdgeHopError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone()).map(|path| {
                    println!("Configuration file created at: {}", path.display());
                    println!("\nAll options are commented out by default.");
                    println!("Edit the file and uncomment the options you want to configure.");
                })
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
        ConfigCommands::Show => show_config(custom_path),
    }
}

/// Initialize a new configuration file, returning where it was written.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<PathBuf, EdgeHopError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(EdgeHopError::InvalidArguments(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path)?;
    Ok(config_path)
}

/// Show the configuration file search paths.
fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)".green().to_string()
        } else if exists {
            " (exists)".dimmed().to_string()
        } else {
            String::new()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'edgehop config init' to create one.");
    }
}

/// Print the effective configuration.
fn show_config(custom_path: Option<&Path>) -> Result<(), EdgeHopError> {
    let loaded = load_existing(custom_path)?;
    match &loaded.path {
        Some(path) => eprintln!("{} {}", "Loaded from".dimmed(), path.display()),
        None => eprintln!("{}", "No configuration file, showing defaults".dimmed()),
    }
    output::print_highlighted_json(&serde_json::to_value(&loaded.config)?);
    Ok(())
}
