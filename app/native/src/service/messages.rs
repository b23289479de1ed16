//! Message types for the service.
//!
//! Window notifications, timer callbacks and queries reach the service as a
//! [`ServiceMessage`] on its single channel. Display changes use a separate
//! flag so they cannot be lost to a full queue.

use tokio::sync::oneshot;

use crate::geometry::Rect;
use crate::host::WindowId;
use crate::jump::{CursorState, Topology};
use crate::window_fill::FillRequest;

/// Messages sent to the service task.
#[derive(Debug)]
pub enum ServiceMessage {
    /// A window finished moving.
    WindowMoved { window_id: WindowId, frame: Rect },

    /// A window gained focus.
    WindowFocused { window_id: WindowId, frame: Rect },

    /// A window was closed.
    WindowDestroyed { window_id: WindowId },

    /// The settle delay of a fill request elapsed.
    FillDue(FillRequest),

    /// Report the current state.
    Status { respond_to: oneshot::Sender<ServiceStatus> },

    /// Stop the service.
    Shutdown,
}

impl ServiceMessage {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WindowMoved { .. } => "WindowMoved",
            Self::WindowFocused { .. } => "WindowFocused",
            Self::WindowDestroyed { .. } => "WindowDestroyed",
            Self::FillDue(_) => "FillDue",
            Self::Status { .. } => "Status",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// Snapshot of the service state, returned by [`ServiceMessage::Status`].
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub topology: Topology,
    pub cursor: CursorState,
    /// Windows known to the fill tracker.
    pub tracked_windows: usize,
    /// Ticks that failed with an error or a panic.
    pub failed_ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names() {
        assert_eq!(ServiceMessage::WindowDestroyed { window_id: 3 }.name(), "WindowDestroyed");
        assert_eq!(ServiceMessage::Shutdown.name(), "Shutdown");
    }
}
