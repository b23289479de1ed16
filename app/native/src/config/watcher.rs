//! Configuration file watcher.
//!
//! Settings are read once at startup, so a change to the configuration file
//! is only reported; the user has to restart edgehop to apply it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Keeps the watch alive; dropping it stops watching.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// The file being watched.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

fn affects(event: &notify::Event, filename: &OsString) -> bool {
    event.paths.iter().any(|p| p.file_name().is_some_and(|name| name == filename))
}

/// Starts watching `config_path` and calls `on_change` after each save.
///
/// The parent directory is watched so editors that save by renaming a
/// temporary file are still noticed. Events arriving within the debounce
/// window of the previous one are dropped.
///
/// # Errors
///
/// Returns the `notify` error if the watcher cannot be created or attached.
pub fn watch_config_file<F>(config_path: &Path, on_change: F) -> notify::Result<ConfigWatcher>
where
    F: Fn(&Path) + Send + 'static,
{
    let filename = config_path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    let reported = config_path.to_path_buf();
    let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);
    let mut last_event: Option<Instant> = None;

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        match result {
            Ok(event) if affects(&event, &filename) => {
                let now = Instant::now();
                if last_event.is_some_and(|t| now.duration_since(t) < debounce) {
                    return;
                }
                last_event = Some(now);
                on_change(&reported);
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "config: watch error"),
        }
    })?;

    let watch_path = config_path.parent().unwrap_or(config_path);
    watcher.watch(watch_path, RecursiveMode::NonRecursive)?;
    tracing::debug!(path = %config_path.display(), "config: watching for changes");

    Ok(ConfigWatcher { _watcher: watcher, path: config_path.to_path_buf() })
}

/// Watches `config_path` and logs that a restart is needed when it changes.
///
/// Failures to set up the watch are logged and yield `None`.
#[must_use]
pub fn watch_and_warn(config_path: &Path) -> Option<ConfigWatcher> {
    let result = watch_config_file(config_path, |path| {
        tracing::warn!(
            path = %path.display(),
            "config: configuration file changed, restart edgehop to apply new settings"
        );
    });

    match result {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(error = %err, "config: failed to watch configuration file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_debounce_duration_is_reasonable() {
        const { assert!(CONFIG_DEBOUNCE_MS >= 100) };
        const { assert!(CONFIG_DEBOUNCE_MS <= 1000) };
    }

    #[test]
    fn watcher_attaches_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        let watcher = watch_config_file(&path, |_| {}).unwrap();
        assert_eq!(watcher.path(), path);
    }

    #[test]
    fn affects_matches_by_file_name() {
        let event = notify::Event::new(notify::EventKind::Any)
            .add_path(PathBuf::from("/tmp/edgehop/config.jsonc"));
        assert!(affects(&event, &OsString::from("config.jsonc")));
        assert!(!affects(&event, &OsString::from("other.jsonc")));
    }
}
