//! Window fill on display change.
//!
//! Tracks which display each window was last seen on. When a move carries a
//! window onto a different display, a [`FillRequest`] is issued; the service
//! applies it after a settle delay, resizing the window to the full frame of
//! its new display. A later move of the same window supersedes any request
//! still waiting.

use std::collections::BTreeMap;

use crate::geometry::Rect;
use crate::host::{HostError, WindowId, WindowManager};
use crate::jump::{DisplayId, Topology};

/// A pending resize of `window` to fill `display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRequest {
    pub window: WindowId,
    pub display: DisplayId,
    /// Only the request matching the window's latest generation is applied.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct TrackedWindow {
    display: DisplayId,
    pending: Option<u64>,
}

/// Per-window display bookkeeping for the fill feature.
#[derive(Debug, Default)]
pub struct WindowFillTracker {
    enabled: bool,
    windows: BTreeMap<WindowId, TrackedWindow>,
    next_generation: u64,
}

impl WindowFillTracker {
    /// Creates a tracker. A disabled tracker ignores every event.
    #[must_use]
    pub fn new(enabled: bool) -> Self { Self { enabled, ..Self::default() } }

    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Number of windows currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize { self.windows.len() }

    /// Display last recorded for `window`.
    #[must_use]
    pub fn display_of(&self, window: WindowId) -> Option<DisplayId> {
        self.windows.get(&window).map(|w| w.display)
    }

    fn display_for(frame: Rect, topology: &Topology) -> Option<DisplayId> {
        topology.resolve_display(frame.center()).map(|d| d.id)
    }

    /// Handles a window move.
    ///
    /// Returns a request when a known window has changed display. The first
    /// sighting of a window only records it.
    pub fn on_window_moved(
        &mut self,
        window: WindowId,
        frame: Rect,
        topology: &Topology,
    ) -> Option<FillRequest> {
        if !self.enabled {
            return None;
        }
        let display_id = Self::display_for(frame, topology)?;

        match self.windows.get_mut(&window) {
            None => {
                self.windows.insert(window, TrackedWindow { display: display_id, pending: None });
                tracing::trace!(window, display = display_id, "fill: tracking window");
                None
            }
            Some(tracked) if tracked.display == display_id => None,
            Some(tracked) => {
                self.next_generation += 1;
                let generation = self.next_generation;
                tracing::debug!(
                    window,
                    from = tracked.display,
                    to = display_id,
                    "fill: window changed display"
                );
                tracked.display = display_id;
                tracked.pending = Some(generation);
                Some(FillRequest { window, display: display_id, generation })
            }
        }
    }

    /// Records the display of a focused window without acting on it.
    pub fn on_window_focused(&mut self, window: WindowId, frame: Rect, topology: &Topology) {
        if !self.enabled {
            return;
        }
        let Some(display) = Self::display_for(frame, topology) else {
            return;
        };
        self.windows
            .entry(window)
            .and_modify(|tracked| tracked.display = display)
            .or_insert(TrackedWindow { display, pending: None });
    }

    /// Forgets a window and anything pending for it.
    pub fn on_window_destroyed(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_some() {
            tracing::trace!(window, "fill: window forgotten");
        }
    }

    /// Applies a request once its settle delay has elapsed.
    ///
    /// Returns `Ok(false)` when the request was superseded, the window is
    /// gone, or its display no longer exists.
    ///
    /// # Errors
    ///
    /// Returns the host error if the window frame cannot be read or set.
    pub fn apply<W: WindowManager + ?Sized>(
        &mut self,
        request: FillRequest,
        host: &W,
        topology: &Topology,
    ) -> Result<bool, HostError> {
        let Some(tracked) = self.windows.get_mut(&request.window) else {
            return Ok(false);
        };
        if tracked.pending != Some(request.generation) {
            tracing::trace!(window = request.window, "fill: request superseded");
            return Ok(false);
        }
        tracked.pending = None;

        let Some(screen) = topology.display(request.display) else {
            tracing::debug!(
                window = request.window,
                display = request.display,
                "fill: display disappeared"
            );
            return Ok(false);
        };

        if host.window_frame(request.window)?.is_none() {
            return Ok(false);
        }

        host.set_window_frame(request.window, screen.frame)?;
        tracing::debug!(
            window = request.window,
            display = screen.id,
            frame = %screen.frame,
            "fill: window resized to display"
        );
        Ok(true)
    }
}
