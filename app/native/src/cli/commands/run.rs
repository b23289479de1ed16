//! `edgehop run`: the background service.

use crate::config::LoadedConfig;
use crate::error::EdgeHopError;

/// Identifier of the single-instance lock.
const INSTANCE_ID: &str = "com.marcosmoura.edgehop";

/// Runs the service until the process is terminated.
///
/// # Errors
///
/// Returns [`EdgeHopError::AlreadyRunning`] if another instance holds the
/// lock, and [`EdgeHopError::Unsupported`] on platforms without a host.
pub fn execute(loaded: &LoadedConfig) -> Result<(), EdgeHopError> {
    let instance = single_instance::SingleInstance::new(INSTANCE_ID)
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    if !instance.is_single() {
        return Err(EdgeHopError::AlreadyRunning);
    }

    if !loaded.config.cursor.is_enabled() && !loaded.config.window_fill.is_enabled() {
        tracing::warn!("run: cursor jumping and window fill are both disabled");
    }

    let _watcher = loaded.path.as_deref().and_then(crate::config::watch_and_warn);
    platform::run(loaded)
}

#[cfg(target_os = "macos")]
mod platform {
    use std::sync::{Arc, mpsc};

    use crate::config::LoadedConfig;
    use crate::error::EdgeHopError;
    use crate::host::macos::{self, AxWindowWatcher, CoreGraphicsWatcher, MacHost};
    use crate::service::{Runner, ServiceError, ServiceSettings};

    /// Drives the service on a worker thread while the main thread runs the
    /// `CFRunLoop` that delivers display reconfiguration callbacks and window
    /// notifications.
    pub fn run(loaded: &LoadedConfig) -> Result<(), EdgeHopError> {
        let settings = ServiceSettings::from(&loaded.config);
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), ServiceError>>(1);

        std::thread::Builder::new().name("edgehop-service".to_string()).spawn(move || {
            runtime.block_on(async move {
                let mut runner = Runner::new(CoreGraphicsWatcher::new())
                    .with_window_watcher(AxWindowWatcher::new());
                let started = runner.start(Arc::new(MacHost::new()), settings).await.map(|_| ());
                let failed = started.is_err();
                let _ = ready_tx.send(started);
                if !failed {
                    std::future::pending::<()>().await;
                }
            });
        })?;

        // Watchers register their run loop sources during start-up
        ready_rx
            .recv()
            .map_err(|_| std::io::Error::other("service thread exited during start-up"))??;

        macos::run_main_loop();
        Err(std::io::Error::other("main run loop exited").into())
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use crate::config::LoadedConfig;
    use crate::error::EdgeHopError;

    pub fn run(_loaded: &LoadedConfig) -> Result<(), EdgeHopError> {
        Err(EdgeHopError::Unsupported(
            "the edge-jump service needs a macOS desktop".to_string(),
        ))
    }
}
