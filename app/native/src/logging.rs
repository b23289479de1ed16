//! Logging setup.
//!
//! All subsystems log through `tracing` with a short subsystem prefix in the
//! message (`jump:`, `fill:`, `service:`, `config:`, `host:`). The binary
//! installs a `tracing-subscriber` formatter writing to stderr so command
//! output on stdout stays clean.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter directive for a `-v` count.
#[must_use]
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("edgehop_lib={level},edgehop={level},warn")
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity` when set. Calling this more
/// than once keeps the first subscriber.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("logging: subscriber already installed");
    }
}
