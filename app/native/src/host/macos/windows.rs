//! Accessibility observers that report window moves, focus changes and closes.
//!
//! One `AXObserver` is installed per regular application. Its run loop
//! source is added to the main run loop, so callbacks arrive on the main
//! thread while [`super::run_main_loop`] runs. A repeating timer on the same
//! run loop observes applications launched later and drops the observers of
//! applications that quit.
//!
//! ```text
//!  AXWindowMoved / AXWindowResized ─────▶ WindowEvent::Moved
//!  AXFocusedWindowChanged / AXWindowCreated ─▶ WindowEvent::Focused
//!  AXUIElementDestroyed / app quit ──────▶ WindowEvent::Destroyed
//! ```

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use core_foundation::base::{CFRelease, TCFType};
use core_foundation::date::CFDate;
use core_foundation::runloop::{
    CFRunLoop, CFRunLoopSource, CFRunLoopSourceRef, CFRunLoopTimer, CFRunLoopTimerRef,
    kCFRunLoopDefaultMode,
};
use core_foundation::string::{CFString, CFStringRef};
use parking_lot::Mutex;

use super::ax::{self, AXError, AXUIElementRef, AxElement, K_AX_ERROR_SUCCESS};
use crate::constants::timing::APP_RESCAN_INTERVAL_MS;
use crate::geometry::Rect;
use crate::host::{HostError, WindowEvent, WindowEventSink, WindowId, WindowWatcher};

// ============================================================================
// Observer Filtering
// ============================================================================

/// Bundle ids of system agents that never own fillable windows.
const SKIP_BUNDLE_IDS: &[&str] = &[
    "com.apple.dock",
    "com.apple.SystemUIServer",
    "com.apple.controlcenter",
    "com.apple.notificationcenterui",
    "com.apple.Spotlight",
    "com.apple.WindowManager",
    "com.apple.loginwindow",
    "com.apple.screencaptureui",
    "com.apple.universalcontrol",
    "com.marcosmoura.edgehop",
];

/// App names to skip when the bundle id is not available.
const SKIP_APP_NAMES: &[&str] =
    &["Dock", "SystemUIServer", "Control Center", "Notification Center", "Spotlight", "loginwindow"];

/// Checks if an app should get an observer.
fn should_observe_app(bundle_id: &str, name: &str) -> bool {
    if !bundle_id.is_empty() && SKIP_BUNDLE_IDS.iter().any(|id| bundle_id.eq_ignore_ascii_case(id)) {
        return false;
    }
    name.is_empty() || !SKIP_APP_NAMES.iter().any(|n| name.eq_ignore_ascii_case(n))
}

// ============================================================================
// Notifications
// ============================================================================

/// Accessibility notifications the observers subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    Moved,
    Resized,
    FocusChanged,
    Created,
    Destroyed,
}

impl Notification {
    const ALL: [Self; 5] =
        [Self::Moved, Self::Resized, Self::FocusChanged, Self::Created, Self::Destroyed];

    const fn name(self) -> &'static str {
        match self {
            Self::Moved => "AXWindowMoved",
            Self::Resized => "AXWindowResized",
            Self::FocusChanged => "AXFocusedWindowChanged",
            Self::Created => "AXWindowCreated",
            Self::Destroyed => "AXUIElementDestroyed",
        }
    }

    fn from_name(name: &str) -> Option<Self> { Self::ALL.into_iter().find(|n| n.name() == name) }

    /// The event reported for a live window. `None` for [`Self::Destroyed`].
    const fn event(self, window_id: WindowId, frame: Rect) -> Option<WindowEvent> {
        match self {
            Self::Moved | Self::Resized => Some(WindowEvent::Moved { window_id, frame }),
            Self::FocusChanged | Self::Created => Some(WindowEvent::Focused { window_id, frame }),
            Self::Destroyed => None,
        }
    }
}

// ============================================================================
// FFI Declarations
// ============================================================================

type AXObserverRef = *mut c_void;
type AXObserverCallback =
    unsafe extern "C" fn(AXObserverRef, AXUIElementRef, *const c_void, *mut c_void);

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXObserverCreate(
        pid: i32,
        callback: AXObserverCallback,
        out_observer: *mut AXObserverRef,
    ) -> AXError;
    fn AXObserverAddNotification(
        observer: AXObserverRef,
        element: AXUIElementRef,
        notification: *const c_void,
        refcon: *mut c_void,
    ) -> AXError;
    fn AXObserverGetRunLoopSource(observer: AXObserverRef) -> CFRunLoopSourceRef;
    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
}

// ============================================================================
// Global State
// ============================================================================

/// Observer state shared with the C callbacks.
static STATE: Mutex<Option<ObserverState>> = Mutex::new(None);

struct ObserverState {
    sink: WindowEventSink,
    observers: HashMap<i32, Observer>,
    _timer: RescanTimer,
}

/// An `AXObserver` and its run loop source.
struct Observer {
    observer: AXObserverRef,
    source: CFRunLoopSource,
}

// Only created, used and released under the STATE lock.
unsafe impl Send for Observer {}

impl Observer {
    fn create(pid: i32) -> Result<Self, String> {
        let mut observer: AXObserverRef = ptr::null_mut();
        let result = unsafe { AXObserverCreate(pid, observer_callback, &raw mut observer) };
        if result != K_AX_ERROR_SUCCESS || observer.is_null() {
            return Err(format!("AXObserverCreate returned {result}"));
        }

        let app = unsafe { AXUIElementCreateApplication(pid) };
        if app.is_null() {
            unsafe { CFRelease(observer.cast_const()) };
            return Err("AXUIElementCreateApplication returned null".to_string());
        }

        let mut added = 0;
        for notification in Notification::ALL {
            let name = CFString::from_static_string(notification.name());
            let result = unsafe {
                AXObserverAddNotification(
                    observer,
                    app,
                    name.as_concrete_TypeRef().cast(),
                    ptr::null_mut(),
                )
            };
            if result == K_AX_ERROR_SUCCESS {
                added += 1;
            } else {
                tracing::trace!(pid, notification = notification.name(), result, "host: notification refused");
            }
        }
        unsafe { CFRelease(app.cast_const()) };

        let source = unsafe { AXObserverGetRunLoopSource(observer) };
        if added == 0 || source.is_null() {
            unsafe { CFRelease(observer.cast_const()) };
            return Err("application accepted no notifications".to_string());
        }

        let source = unsafe { CFRunLoopSource::wrap_under_get_rule(source) };
        CFRunLoop::get_main().add_source(&source, unsafe { kCFRunLoopDefaultMode });
        Ok(Self { observer, source })
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        CFRunLoop::get_main().remove_source(&self.source, unsafe { kCFRunLoopDefaultMode });
        unsafe { CFRelease(self.observer.cast_const()) };
    }
}

/// Repeating timer that re-syncs observers with the running applications.
struct RescanTimer(CFRunLoopTimer);

// Only created and dropped under the STATE lock.
unsafe impl Send for RescanTimer {}

impl RescanTimer {
    fn schedule() -> Self {
        let interval = Duration::from_millis(APP_RESCAN_INTERVAL_MS).as_secs_f64();
        let timer = CFRunLoopTimer::new(
            CFDate::now().abs_time() + interval,
            interval,
            0,
            0,
            rescan_callback,
            ptr::null_mut(),
        );
        CFRunLoop::get_main().add_timer(&timer, unsafe { kCFRunLoopDefaultMode });
        Self(timer)
    }
}

impl Drop for RescanTimer {
    fn drop(&mut self) {
        CFRunLoop::get_main().remove_timer(&self.0, unsafe { kCFRunLoopDefaultMode });
    }
}

// ============================================================================
// Running Applications
// ============================================================================

struct RunningApp {
    pid: i32,
    bundle_id: String,
    name: String,
}

/// Regular (Dock-visible) applications other than this process.
fn running_apps() -> Vec<RunningApp> {
    use objc::runtime::{Class, Object};
    use objc::{msg_send, sel, sel_impl};

    let own_pid = i32::try_from(std::process::id()).unwrap_or(-1);

    unsafe {
        let Some(workspace_class) = Class::get("NSWorkspace") else {
            return Vec::new();
        };
        let workspace: *mut Object = msg_send![workspace_class, sharedWorkspace];
        if workspace.is_null() {
            return Vec::new();
        }
        let apps: *mut Object = msg_send![workspace, runningApplications];
        if apps.is_null() {
            return Vec::new();
        }

        let count: usize = msg_send![apps, count];
        let mut running = Vec::with_capacity(count);
        for i in 0..count {
            let app: *mut Object = msg_send![apps, objectAtIndex: i];
            if app.is_null() {
                continue;
            }

            // NSApplicationActivationPolicyRegular
            let activation_policy: i64 = msg_send![app, activationPolicy];
            let pid: i32 = msg_send![app, processIdentifier];
            if activation_policy != 0 || pid <= 0 || pid == own_pid {
                continue;
            }

            running.push(RunningApp {
                pid,
                bundle_id: ns_string_to_rust(msg_send![app, bundleIdentifier]),
                name: ns_string_to_rust(msg_send![app, localizedName]),
            });
        }
        running
    }
}

/// Converts an `NSString` to a Rust string. Null becomes empty.
unsafe fn ns_string_to_rust(ns_string: *mut objc::runtime::Object) -> String {
    use objc::{msg_send, sel, sel_impl};

    if ns_string.is_null() {
        return String::new();
    }
    let utf8: *const std::ffi::c_char = unsafe { msg_send![ns_string, UTF8String] };
    if utf8.is_null() {
        return String::new();
    }
    unsafe { std::ffi::CStr::from_ptr(utf8) }.to_string_lossy().into_owned()
}

/// Observes new applications and drops observers of ones that quit.
///
/// Returns the windows of the applications that quit.
fn sync_observers(state: &mut ObserverState) -> Vec<WindowId> {
    let apps: Vec<RunningApp> = running_apps()
        .into_iter()
        .filter(|app| should_observe_app(&app.bundle_id, &app.name))
        .collect();

    let mut closed = Vec::new();
    state.observers.retain(|pid, _| {
        let alive = apps.iter().any(|app| app.pid == *pid);
        if !alive {
            closed.extend(ax::forget_app(*pid));
        }
        alive
    });

    for app in apps {
        if state.observers.contains_key(&app.pid) {
            continue;
        }
        match Observer::create(app.pid) {
            Ok(observer) => {
                tracing::trace!(pid = app.pid, name = %app.name, "host: observing application");
                state.observers.insert(app.pid, observer);
            }
            // Apps still launching refuse observers; the next scan retries
            Err(err) => tracing::trace!(pid = app.pid, name = %app.name, error = %err, "host: observer failed"),
        }
    }
    closed
}

// ============================================================================
// Callbacks
// ============================================================================

/// Resolves the event for a notification on `element`, updating the registry.
///
/// # Safety
///
/// `element` must be the element passed to the observer callback.
unsafe fn resolve(notification: Notification, element: AXUIElementRef) -> Option<WindowEvent> {
    if notification == Notification::Destroyed {
        return ax::forget_element(element).map(|window_id| WindowEvent::Destroyed { window_id });
    }

    let window = unsafe { AxElement::retain(element) }?;
    let window_id = window.window_id()?;
    let frame = window.frame()?;
    ax::remember(window_id, window);
    notification.event(window_id, frame)
}

fn current_sink() -> Option<WindowEventSink> {
    STATE.lock().as_ref().map(|state| Arc::clone(&state.sink))
}

/// Callback invoked by the Accessibility API on the main run loop.
///
/// # Safety
///
/// Called by macOS with an element and a notification name that are valid
/// for the duration of the call.
unsafe extern "C" fn observer_callback(
    _observer: AXObserverRef,
    element: AXUIElementRef,
    notification: *const c_void,
    _refcon: *mut c_void,
) {
    if notification.is_null() {
        return;
    }
    let name = unsafe { CFString::wrap_under_get_rule(notification as CFStringRef) }.to_string();
    let Some(notification) = Notification::from_name(&name) else {
        return;
    };

    let Some(event) = (unsafe { resolve(notification, element) }) else {
        return;
    };
    if let Some(sink) = current_sink() {
        sink(event);
    }
}

extern "C" fn rescan_callback(_timer: CFRunLoopTimerRef, _info: *mut c_void) {
    let (sink, closed) = {
        let mut guard = STATE.lock();
        let Some(state) = guard.as_mut() else {
            return;
        };
        (Arc::clone(&state.sink), sync_observers(state))
    };

    for window_id in closed {
        sink(WindowEvent::Destroyed { window_id });
    }
}

// ============================================================================
// Watcher
// ============================================================================

/// [`WindowWatcher`] backed by Accessibility observers.
///
/// Needs the Accessibility permission and a running main run loop.
#[derive(Debug, Default)]
pub struct AxWindowWatcher {
    started: bool,
}

impl AxWindowWatcher {
    /// Creates a stopped watcher.
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl WindowWatcher for AxWindowWatcher {
    fn start(&mut self, sink: WindowEventSink) -> Result<(), HostError> {
        self.stop();

        if !ax::is_trusted() {
            return Err(HostError::Watcher(
                "accessibility access not granted (System Settings > Privacy & Security)".to_string(),
            ));
        }

        let mut state =
            ObserverState { sink, observers: HashMap::new(), _timer: RescanTimer::schedule() };
        sync_observers(&mut state);
        tracing::debug!(apps = state.observers.len(), "host: window observers started");

        *STATE.lock() = Some(state);
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        if !std::mem::take(&mut self.started) {
            return;
        }

        // Dropping the state removes every source and the timer
        let state = STATE.lock().take();
        drop(state);
        ax::forget_all();
        tracing::debug!("host: window observers stopped");
    }
}

impl Drop for AxWindowWatcher {
    fn drop(&mut self) { self.stop(); }
}
