#![allow(clippy::multiple_crate_versions)]

//! Edgehop - multi-monitor cursor edge jumping.
//!
//! This binary serves as both the background service and the CLI:
//! - When called with no arguments: runs the service (same as `edgehop run`)
//! - When called with subcommands (e.g., `edgehop zones`): runs CLI commands

fn main() {
    let run_service = std::env::args().len() == 1;

    let result = if run_service { edgehop_lib::cli::run_default() } else { edgehop_lib::cli::run() };

    if let Err(err) = result {
        eprintln!("edgehop: {err}");
        std::process::exit(1);
    }
}
