//! Service lifecycle.
//!
//! A [`Runner`] pairs one display watcher, and optionally one window watcher,
//! with at most one running service. Starting again stops the previous
//! service and watchers first, so there is never more than one poll loop or
//! reconfiguration callback alive.

use std::sync::Arc;

use super::{Service, ServiceError, ServiceHandle, ServiceSettings};
use crate::host::{DisplayWatcher, Host, WindowEvent, WindowWatcher};

/// Owns the watchers and the current service.
pub struct Runner<W: DisplayWatcher> {
    watcher: W,
    windows: Option<Box<dyn WindowWatcher>>,
    service: Option<ServiceHandle>,
}

impl<W: DisplayWatcher> Runner<W> {
    /// Creates a runner with nothing started.
    pub const fn new(watcher: W) -> Self { Self { watcher, windows: None, service: None } }

    /// Adds a window watcher that feeds the window-fill tracker.
    ///
    /// It is only started when window fill is enabled.
    #[must_use]
    pub fn with_window_watcher(mut self, watcher: impl WindowWatcher + 'static) -> Self {
        self.windows = Some(Box::new(watcher));
        self
    }

    /// The running service, if any.
    #[must_use]
    pub const fn service(&self) -> Option<&ServiceHandle> { self.service.as_ref() }

    /// Starts a service on `host` and routes display changes to it.
    ///
    /// Any previously started service and watchers are stopped first. A
    /// window watcher that fails to start only disables window fill.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Watcher`] if the display watcher cannot be
    /// registered; the new service is stopped again in that case.
    pub async fn start<H: Host + 'static>(
        &mut self,
        host: Arc<H>,
        settings: ServiceSettings,
    ) -> Result<ServiceHandle, ServiceError> {
        self.stop().await;

        let handle = Service::spawn(host, settings);
        let notify = handle.clone();
        if let Err(err) = self.watcher.start(Arc::new(move || notify.notify_displays_changed())) {
            let _ = handle.stop().await;
            return Err(err.into());
        }

        if settings.fill_enabled
            && let Some(windows) = self.windows.as_mut()
        {
            let sink = handle.clone();
            let started = windows.start(Arc::new(move |event: WindowEvent| {
                if let Err(err) = sink.window_event(event) {
                    tracing::debug!(?event, error = %err, "service: window event dropped");
                }
            }));
            if let Err(err) = started {
                tracing::warn!(error = %err, "service: window events unavailable, window fill is off");
            }
        }

        self.service = Some(handle.clone());
        Ok(handle)
    }

    /// Stops the watchers and the service. Safe to call when nothing runs.
    pub async fn stop(&mut self) {
        if let Some(windows) = self.windows.as_mut() {
            windows.stop();
        }
        self.watcher.stop();
        if let Some(handle) = self.service.take() {
            if let Err(err) = handle.stop().await {
                tracing::warn!(error = %err, "service: previous service ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geometry::Rect;
    use crate::host::virtual_host::VirtualHost;
    use crate::host::{DisplayChangeNotifier, HostError, WindowEventSink};

    fn host() -> Arc<VirtualHost> {
        Arc::new(VirtualHost::new(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 1080.0),
        ]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_drives_rebuilds() {
        let host = host();
        let mut runner = Runner::new(host.watcher());
        let handle = runner.start(Arc::clone(&host), ServiceSettings::default()).await.unwrap();

        host.set_displays(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(handle.status().await.unwrap().topology.is_empty());
        runner.stop().await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_stops_previous_service() {
        let host = host();
        let mut runner = Runner::new(host.watcher());
        let first = runner.start(Arc::clone(&host), ServiceSettings::default()).await.unwrap();
        let second = runner.start(Arc::clone(&host), ServiceSettings::default()).await.unwrap();

        assert!(first.is_finished());
        assert!(!second.is_finished());
        assert!(second.status().await.is_ok());
        runner.stop().await;
    }

    struct FailingWatcher;

    impl DisplayWatcher for FailingWatcher {
        fn start(&mut self, _notifier: DisplayChangeNotifier) -> Result<(), HostError> {
            Err(HostError::Watcher("denied".into()))
        }

        fn stop(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_failure_is_reported() {
        let mut runner = Runner::new(FailingWatcher);
        let err = runner.start(host(), ServiceSettings::default()).await.err().unwrap();
        assert!(matches!(err, ServiceError::Watcher(_)));
        assert!(runner.service().is_none());
    }

    struct DeniedWindows;

    impl WindowWatcher for DeniedWindows {
        fn start(&mut self, _sink: WindowEventSink) -> Result<(), HostError> {
            Err(HostError::Watcher("accessibility access not granted".into()))
        }

        fn stop(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_watcher_feeds_fill_tracker() {
        let host = host();
        let mut runner = Runner::new(host.watcher()).with_window_watcher(host.window_watcher());
        let settings = ServiceSettings { cursor_enabled: false, ..ServiceSettings::default() };
        let handle = runner.start(Arc::clone(&host), settings).await.unwrap();

        host.focus_window(4, Rect::new(100.0, 100.0, 800.0, 600.0));
        assert_eq!(handle.status().await.unwrap().tracked_windows, 1);

        host.close_window(4);
        assert_eq!(handle.status().await.unwrap().tracked_windows, 0);

        runner.stop().await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_watcher_skipped_when_fill_disabled() {
        let host = host();
        let mut runner = Runner::new(host.watcher()).with_window_watcher(host.window_watcher());
        let settings = ServiceSettings { fill_enabled: false, ..ServiceSettings::default() };
        let handle = runner.start(Arc::clone(&host), settings).await.unwrap();

        host.focus_window(4, Rect::new(100.0, 100.0, 800.0, 600.0));
        assert_eq!(handle.status().await.unwrap().tracked_windows, 0);
        runner.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_watcher_failure_keeps_service() {
        let host = host();
        let mut runner = Runner::new(host.watcher()).with_window_watcher(DeniedWindows);
        let handle = runner.start(host, ServiceSettings::default()).await.unwrap();
        assert!(!handle.is_finished());
        assert!(handle.status().await.is_ok());
        runner.stop().await;
    }
}
