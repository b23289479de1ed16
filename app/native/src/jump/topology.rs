//! Display topology snapshot.
//!
//! Reads the current display frames from the host and assigns each a stable
//! 1-based identity in host order. The snapshot is immutable; a display
//! change produces a new one.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::host::DisplayProvider;

/// Identity of a display within one topology snapshot (1-based).
pub type DisplayId = u32;

/// A display in a topology snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Display {
    /// Sequential identity, in host discovery order.
    pub id: DisplayId,
    /// Global frame.
    pub frame: Rect,
}

impl Display {
    /// Creates a display.
    #[must_use]
    pub const fn new(id: DisplayId, frame: Rect) -> Self { Self { id, frame } }
}

/// Enumerates displays from the host.
///
/// A failing host query is logged and yields no displays, which disables
/// jumping until the next successful rebuild.
pub fn build_topology<P: DisplayProvider + ?Sized>(host: &P) -> Vec<Display> {
    match host.displays() {
        Ok(frames) => displays_from_rects(frames),
        Err(err) => {
            tracing::warn!(error = %err, "jump: display query failed, jumping disabled");
            Vec::new()
        }
    }
}

/// Assigns identities to a list of display frames.
///
/// Degenerate frames (zero or negative size) are skipped; identities stay
/// sequential over the frames that remain.
#[must_use]
pub fn displays_from_rects(frames: impl IntoIterator<Item = Rect>) -> Vec<Display> {
    let mut displays = Vec::new();
    for frame in frames {
        if !frame.is_valid() {
            tracing::warn!(%frame, "jump: ignoring degenerate display frame");
            continue;
        }
        let id = DisplayId::try_from(displays.len() + 1).unwrap_or(DisplayId::MAX);
        displays.push(Display::new(id, frame));
    }
    displays
}

/// Returns the display containing `point`, falling back to the nearest one.
///
/// The fallback covers positions that fall in a gap between displays or
/// slightly outside them because of rounding.
#[must_use]
pub fn locate(displays: &[Display], point: Point) -> Option<&Display> {
    displays.iter().find(|d| d.frame.contains(point)).or_else(|| nearest(displays, point))
}

/// Returns the display closest to `point`. Ties go to the first display.
#[must_use]
pub fn nearest(displays: &[Display], point: Point) -> Option<&Display> {
    let mut best: Option<(&Display, f64)> = None;
    for display in displays {
        let distance = display.frame.distance_squared_to(point);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((display, distance));
        }
    }
    best.map(|(display, _)| display)
}
