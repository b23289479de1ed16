//! CoreGraphics-backed host for macOS.
//!
//! Displays come from `CGGetActiveDisplayList`/`CGDisplayBounds`, which
//! already report global coordinates with a top-left origin, so no flipping
//! is required. The cursor is read through a fresh `CGEvent` and moved with
//! `CGWarpMouseCursorPosition`. Window frames go through the Accessibility
//! API for windows reported by an [`AxWindowWatcher`].
//!
//! # Display change notifications
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  CGDisplayRegisterReconfigurationCallback    │
//! └──────────────────────┬───────────────────────┘
//!                        │ C callback (any thread)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  CoreGraphicsWatcher                         │
//! │  - ignores "begin configuration" callbacks   │
//! │  - forwards everything else to the notifier  │
//! └──────────────────────┬───────────────────────┘
//!                        │ DisplayChangeNotifier
//!                        ▼
//!           ServiceHandle::notify_displays_changed
//! ```

mod ax;
mod windows;

use std::ffi::c_void;

use core_foundation::runloop::CFRunLoop;
use core_graphics::display::CGDisplay;
use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use super::{
    Clock, CursorDevice, DisplayChangeNotifier, DisplayProvider, DisplayWatcher, HostError,
    MonotonicClock, WindowId, WindowManager,
};
pub use self::windows::AxWindowWatcher;
use crate::geometry::{Point, Rect};

/// Display reconfiguration flags from CoreGraphics.
#[allow(non_upper_case_globals)]
mod cg_flags {
    /// Display is being reconfigured (about to change).
    pub const kCGDisplayBeginConfigurationFlag: u32 = 1 << 0;
}

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: unsafe extern "C" fn(u32, u32, *mut c_void),
        user_info: *mut c_void,
    ) -> i32;

    fn CGDisplayRemoveReconfigurationCallback(
        callback: unsafe extern "C" fn(u32, u32, *mut c_void),
        user_info: *mut c_void,
    ) -> i32;

    fn CGAssociateMouseAndMouseCursorPosition(connected: u32) -> i32;
}

/// Runs the main thread's run loop, which delivers display reconfiguration
/// callbacks and window notifications.
///
/// Returns only if the run loop is stopped or has no sources left.
pub fn run_main_loop() { CFRunLoop::run_current(); }

// ============================================================================
// Host
// ============================================================================

/// Host backed by CoreGraphics.
#[derive(Debug, Default)]
pub struct MacHost {
    clock: MonotonicClock,
}

impl MacHost {
    /// Creates a new host.
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl DisplayProvider for MacHost {
    fn displays(&self) -> Result<Vec<Rect>, HostError> {
        let ids = CGDisplay::active_displays()
            .map_err(|code| HostError::DisplayQuery(format!("CGGetActiveDisplayList: {code}")))?;

        Ok(ids
            .into_iter()
            .map(|id| {
                let bounds = CGDisplay::new(id).bounds();
                Rect::new(bounds.origin.x, bounds.origin.y, bounds.size.width, bounds.size.height)
            })
            .collect())
    }
}

impl CursorDevice for MacHost {
    fn cursor_position(&self) -> Result<Point, HostError> {
        let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState)
            .map_err(|()| HostError::CursorUnavailable)?;
        let event = CGEvent::new(source).map_err(|()| HostError::CursorUnavailable)?;
        let location = event.location();
        Ok(Point::new(location.x, location.y))
    }

    fn warp_cursor(&self, to: Point) -> Result<(), HostError> {
        CGDisplay::warp_mouse_cursor_position(CGPoint::new(to.x, to.y))
            .map_err(|code| HostError::Warp(format!("CGWarpMouseCursorPosition: {code}")))?;

        // Warping suppresses mouse events for a short interval unless the
        // cursor is re-associated with the mouse.
        unsafe {
            CGAssociateMouseAndMouseCursorPosition(1);
        }
        Ok(())
    }
}

impl Clock for MacHost {
    fn now_seconds(&self) -> f64 { self.clock.now_seconds() }
}

impl WindowManager for MacHost {
    fn window_frame(&self, window_id: WindowId) -> Result<Option<Rect>, HostError> {
        Ok(ax::window(window_id).and_then(|element| element.frame()))
    }

    fn set_window_frame(&self, window_id: WindowId, frame: Rect) -> Result<(), HostError> {
        let element = ax::window(window_id).ok_or_else(|| HostError::Window {
            window_id,
            message: "not seen by the window observer".to_string(),
        })?;

        element.set_frame(frame).map_err(|code| HostError::Window {
            window_id,
            message: format!("AXUIElementSetAttributeValue returned {code}"),
        })
    }
}

// ============================================================================
// Display Watcher
// ============================================================================

/// CoreGraphics display reconfiguration callback.
///
/// # Safety
///
/// `user_info` is the `Box<DisplayChangeNotifier>` registered by
/// [`CoreGraphicsWatcher::start`], which stays alive until the callback is
/// removed.
unsafe extern "C" fn display_reconfiguration_callback(
    _display: u32,
    flags: u32,
    user_info: *mut c_void,
) {
    // Wait for the change itself
    if flags & cg_flags::kCGDisplayBeginConfigurationFlag != 0 {
        return;
    }

    if user_info.is_null() {
        return;
    }

    let notifier = unsafe { &*user_info.cast::<DisplayChangeNotifier>() };
    tracing::debug!(flags, "host: display reconfiguration");
    notifier();
}

/// Display watcher registered with CoreGraphics.
#[derive(Default)]
pub struct CoreGraphicsWatcher {
    registered: Option<*mut DisplayChangeNotifier>,
}

// The raw pointer is only touched from start/stop, which take `&mut self`.
unsafe impl Send for CoreGraphicsWatcher {}

impl CoreGraphicsWatcher {
    /// Creates a stopped watcher.
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl DisplayWatcher for CoreGraphicsWatcher {
    fn start(&mut self, notifier: DisplayChangeNotifier) -> Result<(), HostError> {
        self.stop();

        let user_info = Box::into_raw(Box::new(notifier));
        let result = unsafe {
            CGDisplayRegisterReconfigurationCallback(
                display_reconfiguration_callback,
                user_info.cast::<c_void>(),
            )
        };

        if result != 0 {
            // Never registered, so the box can be reclaimed immediately
            drop(unsafe { Box::from_raw(user_info) });
            return Err(HostError::Watcher(format!(
                "CGDisplayRegisterReconfigurationCallback returned {result}"
            )));
        }

        self.registered = Some(user_info);
        tracing::debug!("host: display watcher started");
        Ok(())
    }

    fn stop(&mut self) {
        let Some(user_info) = self.registered.take() else {
            return;
        };

        let result = unsafe {
            CGDisplayRemoveReconfigurationCallback(
                display_reconfiguration_callback,
                user_info.cast::<c_void>(),
            )
        };

        if result == 0 {
            drop(unsafe { Box::from_raw(user_info) });
        } else {
            // CoreGraphics may still call back with this pointer, so it is leaked
            tracing::warn!(result, "host: failed to remove display reconfiguration callback");
        }
        tracing::debug!("host: display watcher stopped");
    }
}

impl Drop for CoreGraphicsWatcher {
    fn drop(&mut self) { self.stop(); }
}
