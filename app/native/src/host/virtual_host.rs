//! In-memory desktop used for dry runs and tests.
//!
//! `VirtualHost` holds a display arrangement, a cursor, a manually advanced
//! clock and a set of windows. Changing the displays fires any watcher
//! started through [`VirtualHost::watcher`], the same way a hotplug would,
//! and the window helpers report to a [`VirtualWindowWatcher`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    Clock, CursorDevice, DisplayChangeNotifier, DisplayProvider, DisplayWatcher, HostError,
    WindowEvent, WindowEventSink, WindowId, WindowManager, WindowWatcher,
};
use crate::geometry::{Point, Rect};

#[derive(Default)]
struct VirtualState {
    displays: Vec<Rect>,
    cursor: Point,
    now: f64,
    windows: BTreeMap<WindowId, Rect>,
    warps: Vec<Point>,
    fail_cursor: bool,
    panic_cursor: bool,
}

/// A scriptable host with no connection to a real desktop.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct VirtualHost {
    state: Arc<Mutex<VirtualState>>,
    notifier: Arc<Mutex<Option<DisplayChangeNotifier>>>,
    window_sink: Arc<Mutex<Option<WindowEventSink>>>,
}

impl VirtualHost {
    /// Creates a host with the given display arrangement.
    #[must_use]
    pub fn new(displays: Vec<Rect>) -> Self {
        let host = Self::default();
        host.state.lock().displays = displays;
        host
    }

    /// Replaces the display arrangement and notifies a started watcher.
    pub fn set_displays(&self, displays: Vec<Rect>) {
        self.state.lock().displays = displays;
        let notifier = self.notifier.lock().clone();
        if let Some(notify) = notifier {
            notify();
        }
    }

    /// Places the cursor, as if the user moved the mouse.
    pub fn move_cursor(&self, to: Point) { self.state.lock().cursor = to; }

    /// Returns the current cursor position.
    #[must_use]
    pub fn cursor(&self) -> Point { self.state.lock().cursor }

    /// Advances the clock by `seconds`.
    pub fn advance(&self, seconds: f64) { self.state.lock().now += seconds; }

    /// Makes subsequent cursor reads fail (or succeed again).
    pub fn set_cursor_failure(&self, fail: bool) { self.state.lock().fail_cursor = fail; }

    /// Makes the next cursor read panic, once.
    pub fn panic_on_next_cursor_read(&self) { self.state.lock().panic_cursor = true; }

    /// Every position the cursor was warped to, oldest first.
    #[must_use]
    pub fn warps(&self) -> Vec<Point> { self.state.lock().warps.clone() }

    /// Adds or replaces a window.
    pub fn put_window(&self, window_id: WindowId, frame: Rect) {
        self.state.lock().windows.insert(window_id, frame);
    }

    /// Removes a window.
    pub fn remove_window(&self, window_id: WindowId) {
        self.state.lock().windows.remove(&window_id);
    }

    /// Moves a window and reports the move, as if the user dragged it.
    pub fn move_window(&self, window_id: WindowId, frame: Rect) {
        self.put_window(window_id, frame);
        self.emit(WindowEvent::Moved { window_id, frame });
    }

    /// Adds or replaces a window and reports it as focused.
    pub fn focus_window(&self, window_id: WindowId, frame: Rect) {
        self.put_window(window_id, frame);
        self.emit(WindowEvent::Focused { window_id, frame });
    }

    /// Removes a window and reports it as closed.
    pub fn close_window(&self, window_id: WindowId) {
        self.remove_window(window_id);
        self.emit(WindowEvent::Destroyed { window_id });
    }

    fn emit(&self, event: WindowEvent) {
        let sink = self.window_sink.lock().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    /// Returns a watcher bound to this host's window helpers.
    #[must_use]
    pub fn window_watcher(&self) -> VirtualWindowWatcher {
        VirtualWindowWatcher { slot: Arc::clone(&self.window_sink) }
    }

    /// Returns a watcher bound to this host's display changes.
    #[must_use]
    pub fn watcher(&self) -> VirtualDisplayWatcher {
        VirtualDisplayWatcher { slot: Arc::clone(&self.notifier) }
    }
}

impl DisplayProvider for VirtualHost {
    fn displays(&self) -> Result<Vec<Rect>, HostError> { Ok(self.state.lock().displays.clone()) }
}

impl CursorDevice for VirtualHost {
    fn cursor_position(&self) -> Result<Point, HostError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.panic_cursor) {
            drop(state);
            panic!("virtual cursor read panicked");
        }
        if state.fail_cursor {
            return Err(HostError::CursorUnavailable);
        }
        Ok(state.cursor)
    }

    fn warp_cursor(&self, to: Point) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.cursor = to;
        state.warps.push(to);
        Ok(())
    }
}

impl Clock for VirtualHost {
    fn now_seconds(&self) -> f64 { self.state.lock().now }
}

impl WindowManager for VirtualHost {
    fn window_frame(&self, window_id: WindowId) -> Result<Option<Rect>, HostError> {
        Ok(self.state.lock().windows.get(&window_id).copied())
    }

    fn set_window_frame(&self, window_id: WindowId, frame: Rect) -> Result<(), HostError> {
        let mut state = self.state.lock();
        match state.windows.get_mut(&window_id) {
            Some(existing) => {
                *existing = frame;
                Ok(())
            }
            None => Err(HostError::Window {
                window_id,
                message: "no such window".to_string(),
            }),
        }
    }
}

/// [`DisplayWatcher`] that fires on [`VirtualHost::set_displays`].
pub struct VirtualDisplayWatcher {
    slot: Arc<Mutex<Option<DisplayChangeNotifier>>>,
}

impl DisplayWatcher for VirtualDisplayWatcher {
    fn start(&mut self, notifier: DisplayChangeNotifier) -> Result<(), HostError> {
        *self.slot.lock() = Some(notifier);
        Ok(())
    }

    fn stop(&mut self) { self.slot.lock().take(); }
}

/// [`WindowWatcher`] fed by the window helpers on [`VirtualHost`].
pub struct VirtualWindowWatcher {
    slot: Arc<Mutex<Option<WindowEventSink>>>,
}

impl WindowWatcher for VirtualWindowWatcher {
    fn start(&mut self, sink: WindowEventSink) -> Result<(), HostError> {
        *self.slot.lock() = Some(sink);
        Ok(())
    }

    fn stop(&mut self) { self.slot.lock().take(); }
}
