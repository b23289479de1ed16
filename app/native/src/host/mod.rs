//! Host collaborator interfaces.
//!
//! Everything Edgehop needs from the operating system goes through the traits
//! in this module, so the jump and window-fill logic can be driven by a real
//! desktop ([`macos`]) or an in-memory one ([`virtual_host`]).
//!
//! All calls are synchronous and expected to return quickly: they run inside
//! the service's poll tick.

#[cfg(target_os = "macos")]
pub mod macos;
pub mod virtual_host;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::geometry::{Point, Rect};

/// Identifier of a top-level window, as assigned by the host.
pub type WindowId = u32;

/// Callback invoked by a [`DisplayWatcher`] when the display set changes.
///
/// May be called from any thread.
pub type DisplayChangeNotifier = Arc<dyn Fn() + Send + Sync>;

/// A window notification reported by a [`WindowWatcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// The window finished moving or resizing.
    Moved { window_id: WindowId, frame: Rect },
    /// The window became the focused window of its application.
    Focused { window_id: WindowId, frame: Rect },
    /// The window was closed.
    Destroyed { window_id: WindowId },
}

/// Callback invoked by a [`WindowWatcher`] for every window event.
///
/// May be called from any thread.
pub type WindowEventSink = Arc<dyn Fn(WindowEvent) + Send + Sync>;

/// Errors reported by host collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The display list could not be queried.
    #[error("display query failed: {0}")]
    DisplayQuery(String),
    /// The cursor position could not be read.
    #[error("cursor position unavailable")]
    CursorUnavailable,
    /// Moving the cursor failed.
    #[error("cursor warp failed: {0}")]
    Warp(String),
    /// A window operation failed.
    #[error("window {window_id}: {message}")]
    Window {
        /// The window the operation targeted.
        window_id: WindowId,
        /// Description of the failure.
        message: String,
    },
    /// A display or window watcher could not be registered.
    #[error("watcher failed: {0}")]
    Watcher(String),
}

/// Enumerates the currently active displays.
pub trait DisplayProvider: Send + Sync {
    /// Returns the frame of every active display, in host order.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DisplayQuery`] if the host cannot be queried.
    fn displays(&self) -> Result<Vec<Rect>, HostError>;
}

/// Absolute cursor position access.
pub trait CursorDevice: Send + Sync {
    /// Returns the cursor position in global coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::CursorUnavailable`] if the position cannot be read.
    fn cursor_position(&self) -> Result<Point, HostError>;

    /// Moves the cursor to `to` without generating a drag.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Warp`] if the host refuses the move.
    fn warp_cursor(&self, to: Point) -> Result<(), HostError>;
}

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn now_seconds(&self) -> f64;
}

/// Window frame access used by the window-fill feature.
pub trait WindowManager: Send + Sync {
    /// Returns the current frame of `window_id`, or `None` if it no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Window`] if the frame cannot be read.
    fn window_frame(&self, window_id: WindowId) -> Result<Option<Rect>, HostError>;

    /// Moves and resizes `window_id` to `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Window`] if the window cannot be resized.
    fn set_window_frame(&self, window_id: WindowId, frame: Rect) -> Result<(), HostError>;
}

/// The full set of collaborators a service needs.
pub trait Host: DisplayProvider + CursorDevice + Clock + WindowManager {}

impl<T> Host for T where T: DisplayProvider + CursorDevice + Clock + WindowManager {}

/// Watches for display configuration changes (hotplug, arrangement, resolution).
pub trait DisplayWatcher: Send {
    /// Starts delivering change notifications to `notifier`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Watcher`] if registration with the host fails.
    fn start(&mut self, notifier: DisplayChangeNotifier) -> Result<(), HostError>;

    /// Stops delivering notifications. Safe to call when not started.
    fn stop(&mut self);
}

/// Watches top-level windows for moves, focus changes and closes.
pub trait WindowWatcher: Send {
    /// Starts delivering window events to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Watcher`] if the host refuses window observation.
    fn start(&mut self, sink: WindowEventSink) -> Result<(), HostError>;

    /// Stops delivering events. Safe to call when not started.
    fn stop(&mut self);
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for MonotonicClock {
    fn default() -> Self { Self::new() }
}

impl Clock for MonotonicClock {
    fn now_seconds(&self) -> f64 { self.origin.elapsed().as_secs_f64() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let first = clock.now_seconds();
        let second = clock.now_seconds();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn test_host_error_display() {
        let err = HostError::Window { window_id: 42, message: "not resizable".into() };
        assert_eq!(err.to_string(), "window 42: not resizable");
        let err = HostError::Watcher("accessibility access not granted".into());
        assert_eq!(err.to_string(), "watcher failed: accessibility access not granted");
    }
}
