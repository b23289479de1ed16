//! Handle for communicating with the service.
//!
//! The `ServiceHandle` is cheap to clone and safe to use from any thread,
//! including native callbacks that run outside the tokio runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc, oneshot};
use tokio::task::JoinHandle;

use super::messages::{ServiceMessage, ServiceStatus};
use crate::geometry::Rect;
use crate::host::{HostError, WindowEvent, WindowId};

/// Error types for service communication.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Failed to send a message to the service.
    #[error("Failed to send message to service: channel closed")]
    SendFailed,

    /// Failed to receive a response from the service.
    #[error("Failed to receive response from service: channel closed")]
    ReceiveFailed,

    /// The service task ended abnormally.
    #[error("Service task failed: {0}")]
    Task(String),

    /// The display watcher could not be started.
    #[error("Display watcher failed: {0}")]
    Watcher(#[from] HostError),
}

/// Display change flag shared by the handle and the service.
///
/// Kept out of the message queue so a change can never be dropped when the
/// queue is full. Repeated changes before the service wakes up coalesce into
/// one rebuild.
#[derive(Debug, Default)]
pub(crate) struct DisplaySignal {
    dirty: AtomicBool,
    notify: Notify,
}

impl DisplaySignal {
    /// Marks the topology stale and wakes the service.
    pub(crate) fn raise(&self) {
        self.dirty.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    /// Clears the flag, returning whether it was set.
    pub(crate) fn take(&self) -> bool { self.dirty.swap(false, Ordering::AcqRel) }

    /// Completes once [`raise`](Self::raise) has been called.
    pub(crate) async fn raised(&self) { self.notify.notified().await; }
}

/// Handle for communicating with a running service.
#[derive(Clone)]
pub struct ServiceHandle {
    sender: mpsc::Sender<ServiceMessage>,
    displays: Arc<DisplaySignal>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ServiceHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<ServiceMessage>,
        displays: Arc<DisplaySignal>,
        task: JoinHandle<()>,
    ) -> Self {
        Self { sender, displays, task: Arc::new(Mutex::new(Some(task))) }
    }

    /// Sends a message without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped or its
    /// queue is full.
    pub fn send(&self, msg: ServiceMessage) -> Result<(), ServiceError> {
        self.sender.try_send(msg).map_err(|_| ServiceError::SendFailed)
    }

    /// Sends a message, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped.
    pub async fn send_async(&self, msg: ServiceMessage) -> Result<(), ServiceError> {
        self.sender.send(msg).await.map_err(|_| ServiceError::SendFailed)
    }

    /// Asks the service to rebuild its topology.
    ///
    /// Safe to call from a display reconfiguration callback. Never blocks and
    /// never fails; the rebuild happens before the service handles its next
    /// tick or message.
    pub fn notify_displays_changed(&self) { self.displays.raise(); }

    /// Reports a finished window move.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped.
    pub fn window_moved(&self, window_id: WindowId, frame: Rect) -> Result<(), ServiceError> {
        self.send(ServiceMessage::WindowMoved { window_id, frame })
    }

    /// Reports a focused window.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped.
    pub fn window_focused(&self, window_id: WindowId, frame: Rect) -> Result<(), ServiceError> {
        self.send(ServiceMessage::WindowFocused { window_id, frame })
    }

    /// Reports a closed window.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped.
    pub fn window_destroyed(&self, window_id: WindowId) -> Result<(), ServiceError> {
        self.send(ServiceMessage::WindowDestroyed { window_id })
    }

    /// Forwards a host window event.
    ///
    /// Used as the sink of a [`WindowWatcher`](crate::host::WindowWatcher).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped or its
    /// queue is full.
    pub fn window_event(&self, event: WindowEvent) -> Result<(), ServiceError> {
        match event {
            WindowEvent::Moved { window_id, frame } => self.window_moved(window_id, frame),
            WindowEvent::Focused { window_id, frame } => self.window_focused(window_id, frame),
            WindowEvent::Destroyed { window_id } => self.window_destroyed(window_id),
        }
    }

    /// Returns a snapshot of the service state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service has stopped, or
    /// [`ServiceError::ReceiveFailed`] if it stopped before answering.
    pub async fn status(&self) -> Result<ServiceStatus, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(ServiceMessage::Status { respond_to: tx }).await?;
        rx.await.map_err(|_| ServiceError::ReceiveFailed)
    }

    /// Returns whether the service task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.lock().as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the service and waits for its task to end.
    ///
    /// Calling this on an already stopped service is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Task`] if the task panicked or was cancelled.
    pub async fn stop(&self) -> Result<(), ServiceError> {
        let Some(task) = self.task.lock().take() else {
            return Ok(());
        };

        // The task may already be gone; awaiting it is enough then
        let _ = self.sender.send(ServiceMessage::Shutdown).await;
        task.await.map_err(|err| ServiceError::Task(err.to_string()))
    }
}
