//! Background service.
//!
//! The service task owns the [`CursorController`] and the
//! [`WindowFillTracker`] and is the only code that mutates them. The poll
//! timer and every host notification are multiplexed inside the same task,
//! so ticks and events never run concurrently:
//!
//! ```text
//!  window events ───┬─▶ mpsc ─┐
//!  settle timers ───┘         │
//!  display watcher ─▶ flag ───┼─▶ Service::run ─▶ controller / fill tracker
//!  poll interval ─────────────┘
//! ```
//!
//! A pending display change is applied before any tick or message is
//! handled, so nothing runs against a topology that is known to be stale.
//!
//! # Fault isolation
//!
//! Each tick and each message is handled inside `catch_unwind`. A host error
//! or a panic is logged and the loop moves on to the next tick; nothing
//! inside the service terminates the process.

mod handle;
mod messages;
mod runner;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use handle::DisplaySignal;
pub use handle::{ServiceError, ServiceHandle};
pub use messages::{ServiceMessage, ServiceStatus};
pub use runner::Runner;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::EdgeHopConfig;
use crate::host::{Host, HostError};
use crate::jump::{CursorController, TickOutcome, Tuning};
use crate::window_fill::{FillRequest, WindowFillTracker};

/// Channel buffer size for the service.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Runtime settings of a service, resolved from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub tuning: Tuning,
    pub poll_interval: Duration,
    pub cursor_enabled: bool,
    pub fill_enabled: bool,
    pub settle_delay: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self { Self::from(&EdgeHopConfig::default()) }
}

impl From<&EdgeHopConfig> for ServiceSettings {
    fn from(config: &EdgeHopConfig) -> Self {
        Self {
            tuning: Tuning::from(&config.cursor),
            poll_interval: Duration::from_millis(config.cursor.poll_interval_ms.max(1)),
            cursor_enabled: config.cursor.is_enabled(),
            fill_enabled: config.window_fill.is_enabled(),
            settle_delay: Duration::from_millis(config.window_fill.settle_delay_ms),
        }
    }
}

/// The service task state.
pub struct Service<H: Host + 'static> {
    host: Arc<H>,
    controller: CursorController,
    fill: WindowFillTracker,
    settings: ServiceSettings,
    receiver: mpsc::Receiver<ServiceMessage>,
    displays: Arc<DisplaySignal>,
    /// Used by settle timers to post back; weak so it never keeps the loop alive.
    sender: mpsc::WeakSender<ServiceMessage>,
    failed_ticks: u64,
    failing: bool,
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl<H: Host + 'static> Service<H> {
    /// Builds the initial topology and spawns the service on the current
    /// tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(host: Arc<H>, settings: ServiceSettings) -> ServiceHandle {
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let displays = Arc::new(DisplaySignal::default());
        let controller = CursorController::from_host(host.as_ref(), settings.tuning);

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            displays = controller.topology().displays().len(),
            zones = controller.topology().zone_count(),
            cursor = settings.cursor_enabled,
            window_fill = settings.fill_enabled,
            "service: started"
        );

        let service = Self {
            host,
            controller,
            fill: WindowFillTracker::new(settings.fill_enabled),
            settings,
            receiver,
            displays: Arc::clone(&displays),
            sender: sender.downgrade(),
            failed_ticks: 0,
            failing: false,
        };

        let task = tokio::spawn(service.run());
        ServiceHandle::new(sender, displays, task)
    }

    async fn run(mut self) {
        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let polling = self.settings.cursor_enabled;
        let displays = Arc::clone(&self.displays);

        loop {
            tokio::select! {
                () = displays.raised() => self.sync_displays(),
                _ = interval.tick(), if polling => {
                    self.sync_displays();
                    self.guarded("Tick", Self::on_tick);
                }
                msg = self.receiver.recv() => match msg {
                    None | Some(ServiceMessage::Shutdown) => break,
                    Some(msg) => {
                        self.sync_displays();
                        let name = msg.name();
                        self.guarded(name, |service| service.handle_message(msg));
                    }
                },
            }
        }

        tracing::info!(ticks = self.controller.state().ticks, "service: stopped");
    }

    /// Runs `f` with panic recovery and error logging.
    fn guarded<F>(&mut self, name: &str, f: F)
    where
        F: FnOnce(&mut Self) -> Result<(), HostError>,
    {
        let result = catch_unwind(AssertUnwindSafe(|| f(self)));

        let failure = match result {
            Ok(Ok(())) => {
                if name == "Tick" && self.failing {
                    tracing::info!("service: ticks recovered");
                    self.failing = false;
                }
                return;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("panic: {}", panic_message(payload.as_ref())),
        };

        if name == "Tick" {
            self.failed_ticks += 1;
            // Report the first failure of a streak loudly, the rest quietly
            if self.failing {
                tracing::debug!(error = %failure, "service: tick failed");
            } else {
                tracing::warn!(error = %failure, "service: tick failed, skipping");
                self.failing = true;
            }
        } else {
            tracing::error!(kind = name, error = %failure, "service: message handling failed");
        }
    }

    /// Rebuilds the topology if a display change is pending.
    fn sync_displays(&mut self) {
        if self.displays.take() {
            self.guarded("DisplaysChanged", |service| {
                service.controller.rebuild(service.host.as_ref());
                Ok(())
            });
        }
    }

    fn on_tick(&mut self) -> Result<(), HostError> {
        match self.controller.tick(self.host.as_ref())? {
            TickOutcome::Jumped(target) => {
                tracing::trace!(display = target.display, point = %target.point, "service: jumped");
            }
            TickOutcome::AtEdge(edge) => tracing::trace!(%edge, "service: at edge, no target"),
            TickOutcome::Idle | TickOutcome::CoolingDown => {}
        }
        Ok(())
    }

    fn handle_message(&mut self, msg: ServiceMessage) -> Result<(), HostError> {
        match msg {
            ServiceMessage::WindowMoved { window_id, frame } => {
                if let Some(request) =
                    self.fill.on_window_moved(window_id, frame, self.controller.topology())
                {
                    self.schedule_fill(request);
                }
            }
            ServiceMessage::WindowFocused { window_id, frame } => {
                self.fill.on_window_focused(window_id, frame, self.controller.topology());
            }
            ServiceMessage::WindowDestroyed { window_id } => self.fill.on_window_destroyed(window_id),
            ServiceMessage::FillDue(request) => {
                self.fill.apply(request, self.host.as_ref(), self.controller.topology())?;
            }
            ServiceMessage::Status { respond_to } => {
                let _ = respond_to.send(ServiceStatus {
                    topology: self.controller.topology().clone(),
                    cursor: *self.controller.state(),
                    tracked_windows: self.fill.tracked(),
                    failed_ticks: self.failed_ticks,
                });
            }
            // Handled by the loop
            ServiceMessage::Shutdown => {}
        }
        Ok(())
    }

    /// Posts the request back to the service once the settle delay elapses.
    fn schedule_fill(&self, request: FillRequest) {
        let sender = self.sender.clone();
        let delay = self.settings.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(ServiceMessage::FillDue(request)).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::host::virtual_host::VirtualHost;
    use crate::host::{CursorDevice, WindowManager};

    fn pair() -> Arc<VirtualHost> {
        Arc::new(VirtualHost::new(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 1080.0),
        ]))
    }

    async fn settle(ms: u64) { tokio::time::sleep(Duration::from_millis(ms)).await; }

    #[test]
    fn test_settings_from_config() {
        let mut config = EdgeHopConfig::default();
        config.window_fill.settle_delay_ms = 450;
        config.cursor.enabled = false;
        let settings = ServiceSettings::from(&config);
        assert_eq!(settings.poll_interval, Duration::from_millis(20));
        assert_eq!(settings.settle_delay, Duration::from_millis(450));
        assert!(!settings.cursor_enabled);
        assert!(settings.fill_enabled);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_jumps_cursor() {
        let host = pair();
        host.move_cursor(Point::new(1918.0, 540.0));

        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());
        settle(30).await;

        assert_eq!(host.warps(), vec![Point::new(1930.0, 540.0)]);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_cursor_never_polls() {
        let host = pair();
        host.move_cursor(Point::new(1918.0, 540.0));

        let settings = ServiceSettings { cursor_enabled: false, ..ServiceSettings::default() };
        let handle = Service::spawn(Arc::clone(&host), settings);
        settle(100).await;

        assert!(host.warps().is_empty());
        assert_eq!(handle.status().await.unwrap().cursor.ticks, 0);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_errors_do_not_stop_the_loop() {
        let host = pair();
        host.set_cursor_failure(true);

        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());
        settle(100).await;
        let status = handle.status().await.unwrap();
        assert!(status.failed_ticks >= 3);

        host.set_cursor_failure(false);
        host.move_cursor(Point::new(1918.0, 540.0));
        settle(40).await;
        assert_eq!(host.cursor_position().unwrap(), Point::new(1930.0, 540.0));

        handle.stop().await.unwrap();
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_panic_is_isolated() {
        let host = pair();
        host.move_cursor(Point::new(960.0, 540.0));

        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());
        settle(30).await;
        assert_eq!(handle.status().await.unwrap().failed_ticks, 0);

        host.panic_on_next_cursor_read();
        host.move_cursor(Point::new(1918.0, 540.0));
        settle(60).await;

        let status = handle.status().await.unwrap();
        assert_eq!(status.failed_ticks, 1);
        assert_eq!(host.warps(), vec![Point::new(1930.0, 540.0)]);
        assert!(!handle.is_finished());
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_change_rebuilds_topology() {
        let host = pair();
        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());
        assert_eq!(handle.status().await.unwrap().topology.zone_count(), 2);

        host.set_displays(vec![Rect::new(0.0, 0.0, 2560.0, 1440.0)]);
        handle.notify_displays_changed();

        let status = handle.status().await.unwrap();
        assert!(status.topology.is_empty());
        assert_eq!(status.topology.displays().len(), 1);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_change_survives_full_queue() {
        let host = pair();
        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());

        // The service has not run yet, so the queue fills up
        let frame = Rect::new(100.0, 100.0, 800.0, 600.0);
        for window_id in 0..256 {
            handle.window_focused(window_id, frame).unwrap();
        }
        assert!(handle.window_focused(999, frame).is_err());

        host.set_displays(vec![Rect::new(0.0, 0.0, 2560.0, 1440.0)]);
        handle.notify_displays_changed();

        let status = handle.status().await.unwrap();
        assert_eq!(status.topology.displays().len(), 1);
        assert!(status.topology.is_empty());
        assert_eq!(status.tracked_windows, 256);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_changes_coalesce() {
        let host = pair();
        let handle = Service::spawn(Arc::clone(&host), ServiceSettings::default());

        host.set_displays(vec![Rect::new(0.0, 0.0, 2560.0, 1440.0)]);
        handle.notify_displays_changed();
        host.set_displays(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 1080.0, 1920.0, 1080.0),
        ]);
        handle.notify_displays_changed();

        let status = handle.status().await.unwrap();
        assert_eq!(status.topology.displays().len(), 2);
        assert_eq!(status.topology.zone_count(), 2);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_fill_after_settle_delay() {
        let host = pair();
        host.put_window(9, Rect::new(100.0, 100.0, 800.0, 600.0));

        let settings = ServiceSettings { cursor_enabled: false, ..ServiceSettings::default() };
        let handle = Service::spawn(Arc::clone(&host), settings);

        handle.window_moved(9, Rect::new(100.0, 100.0, 800.0, 600.0)).unwrap();
        host.put_window(9, Rect::new(2000.0, 100.0, 800.0, 600.0));
        handle.window_moved(9, Rect::new(2000.0, 100.0, 800.0, 600.0)).unwrap();

        settle(100).await;
        assert_eq!(host.window_frame(9).unwrap(), Some(Rect::new(2000.0, 100.0, 800.0, 600.0)));

        settle(250).await;
        assert_eq!(host.window_frame(9).unwrap(), Some(Rect::new(1920.0, 0.0, 1920.0, 1080.0)));
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let handle = Service::spawn(pair(), ServiceSettings::default());
        handle.stop().await.unwrap();
        handle.stop().await.unwrap();
        assert!(handle.send(ServiceMessage::WindowDestroyed { window_id: 1 }).is_err());
    }
}
