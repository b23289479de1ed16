//! Accessibility API access to window frames.
//!
//! Window elements are learned from observer notifications (see
//! [`super::windows`]) and kept in a registry keyed by the CoreGraphics
//! window id, which is how the rest of Edgehop names windows.

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::ptr;

use core_foundation::base::{CFEqual, CFRelease, CFRetain, TCFType};
use core_foundation::string::CFString;
use core_graphics::geometry::{CGPoint, CGSize};
use parking_lot::Mutex;

use crate::geometry::Rect;
use crate::host::WindowId;

// ============================================================================
// FFI Declarations
// ============================================================================

pub(super) type AXUIElementRef = *mut c_void;
pub(super) type AXError = i32;

pub(super) const K_AX_ERROR_SUCCESS: AXError = 0;
const K_AX_ERROR_FAILURE: AXError = -25200;

// AXValue type constants
const K_AX_VALUE_TYPE_CG_POINT: i32 = 1;
const K_AX_VALUE_TYPE_CG_SIZE: i32 = 2;

const AX_POSITION: &str = "AXPosition";
const AX_SIZE: &str = "AXSize";

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *mut *mut c_void,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *const c_void,
    ) -> AXError;
    fn AXUIElementGetPid(element: AXUIElementRef, pid: *mut i32) -> AXError;
    fn AXValueCreate(value_type: i32, value: *const c_void) -> *mut c_void;
    fn AXValueGetValue(value: *const c_void, value_type: i32, value_ptr: *mut c_void) -> bool;
    fn _AXUIElementGetWindow(element: AXUIElementRef, window_id: *mut u32) -> AXError;
}

/// Returns whether this process may use the Accessibility API.
pub(super) fn is_trusted() -> bool { unsafe { AXIsProcessTrusted() } }

// ============================================================================
// Elements
// ============================================================================

/// An owned reference to an accessibility element.
pub(super) struct AxElement(AXUIElementRef);

// AXUIElement references are immutable handles usable from any thread.
unsafe impl Send for AxElement {}
unsafe impl Sync for AxElement {}

impl AxElement {
    /// Takes a new reference to `element`.
    ///
    /// # Safety
    ///
    /// `element` must be null or a valid `AXUIElementRef`.
    pub(super) unsafe fn retain(element: AXUIElementRef) -> Option<Self> {
        if element.is_null() {
            return None;
        }
        unsafe { CFRetain(element.cast_const()) };
        Some(Self(element))
    }

    /// The CoreGraphics window id of this element, if it is a window.
    pub(super) fn window_id(&self) -> Option<WindowId> {
        let mut window_id = 0_u32;
        let result = unsafe { _AXUIElementGetWindow(self.0, &raw mut window_id) };
        (result == K_AX_ERROR_SUCCESS && window_id != 0).then_some(window_id)
    }

    /// The process owning this element.
    fn pid(&self) -> Option<i32> {
        let mut pid = 0_i32;
        let result = unsafe { AXUIElementGetPid(self.0, &raw mut pid) };
        (result == K_AX_ERROR_SUCCESS).then_some(pid)
    }

    /// Current position and size.
    pub(super) fn frame(&self) -> Option<Rect> {
        let position = self.copy_value(AX_POSITION, K_AX_VALUE_TYPE_CG_POINT, CGPoint::new(0.0, 0.0))?;
        let size = self.copy_value(AX_SIZE, K_AX_VALUE_TYPE_CG_SIZE, CGSize::new(0.0, 0.0))?;
        Some(Rect::new(position.x, position.y, size.width, size.height))
    }

    /// Moves and resizes the element.
    ///
    /// Size is set before and after the move: the first lets the window
    /// shrink before it moves, the second catches apps that clamp mid-move.
    pub(super) fn set_frame(&self, frame: Rect) -> Result<(), AXError> {
        let size = CGSize::new(frame.width, frame.height);
        let first = self.set_value(AX_SIZE, K_AX_VALUE_TYPE_CG_SIZE, &size);
        self.set_value(AX_POSITION, K_AX_VALUE_TYPE_CG_POINT, &CGPoint::new(frame.x, frame.y))?;
        self.set_value(AX_SIZE, K_AX_VALUE_TYPE_CG_SIZE, &size).or(first)
    }

    /// Whether `element` refers to the same UI element.
    pub(super) fn same_as(&self, element: AXUIElementRef) -> bool {
        !element.is_null() && unsafe { CFEqual(self.0.cast_const(), element.cast_const()) } != 0
    }

    fn copy_value<T>(&self, attribute: &'static str, value_type: i32, mut out: T) -> Option<T> {
        let name = CFString::from_static_string(attribute);
        let mut value: *mut c_void = ptr::null_mut();
        let result = unsafe {
            AXUIElementCopyAttributeValue(self.0, name.as_concrete_TypeRef().cast(), &raw mut value)
        };
        if result != K_AX_ERROR_SUCCESS || value.is_null() {
            return None;
        }

        let ok = unsafe { AXValueGetValue(value.cast_const(), value_type, (&raw mut out).cast()) };
        unsafe { CFRelease(value.cast_const()) };
        ok.then_some(out)
    }

    fn set_value<T>(&self, attribute: &'static str, value_type: i32, value: &T) -> Result<(), AXError> {
        let name = CFString::from_static_string(attribute);
        let boxed = unsafe { AXValueCreate(value_type, ptr::from_ref(value).cast()) };
        if boxed.is_null() {
            return Err(K_AX_ERROR_FAILURE);
        }

        let result = unsafe {
            AXUIElementSetAttributeValue(self.0, name.as_concrete_TypeRef().cast(), boxed.cast_const())
        };
        unsafe { CFRelease(boxed.cast_const()) };

        if result == K_AX_ERROR_SUCCESS { Ok(()) } else { Err(result) }
    }
}

impl Clone for AxElement {
    fn clone(&self) -> Self {
        unsafe { CFRetain(self.0.cast_const()) };
        Self(self.0)
    }
}

impl Drop for AxElement {
    fn drop(&mut self) { unsafe { CFRelease(self.0.cast_const()) }; }
}

// ============================================================================
// Window Registry
// ============================================================================

/// Window elements seen by the observers, by window id.
static WINDOWS: Mutex<BTreeMap<WindowId, AxElement>> = Mutex::new(BTreeMap::new());

/// Records the element behind `window_id`.
pub(super) fn remember(window_id: WindowId, element: AxElement) {
    WINDOWS.lock().insert(window_id, element);
}

/// Returns the element behind `window_id`.
pub(super) fn window(window_id: WindowId) -> Option<AxElement> { WINDOWS.lock().get(&window_id).cloned() }

/// Forgets the window whose element equals `element`, returning its id.
pub(super) fn forget_element(element: AXUIElementRef) -> Option<WindowId> {
    let mut windows = WINDOWS.lock();
    let window_id = windows.iter().find(|(_, known)| known.same_as(element)).map(|(id, _)| *id)?;
    windows.remove(&window_id);
    Some(window_id)
}

/// Forgets every window owned by `pid`, returning their ids.
pub(super) fn forget_app(pid: i32) -> Vec<WindowId> {
    let mut windows = WINDOWS.lock();
    let owned: Vec<WindowId> = windows
        .iter()
        .filter(|(_, element)| element.pid().is_none_or(|owner| owner == pid))
        .map(|(id, _)| *id)
        .collect();
    for window_id in &owned {
        windows.remove(window_id);
    }
    owned
}

/// Forgets every window.
pub(super) fn forget_all() { WINDOWS.lock().clear(); }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_window_is_absent() {
        assert!(window(u32::MAX).is_none());
        assert!(forget_element(ptr::null_mut()).is_none());
    }

    #[test]
    fn test_null_element_is_not_retained() {
        assert!(unsafe { AxElement::retain(ptr::null_mut()) }.is_none());
    }
}
