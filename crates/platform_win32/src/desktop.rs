//! Live view of the OS window stack.
//!
//! [`Win32Desktop`] pairs window enumeration with the monitor list captured
//! at toggle time, giving the core crate everything it needs: enumeration
//! order, "window above" links for the Z-order walk, and window-to-monitor
//! placement.

use showdesk_core::{Desktop, MonitorIndex};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetTopWindow, GetWindow, GW_HWNDLAST, GW_HWNDPREV,
};

use crate::monitor::MonitorInfo;
use crate::window::WindowHandle;
use crate::Win32Error;

/// Enumerates all top-level windows in Z-order, topmost first.
pub fn enumerate_windows() -> Result<Vec<WindowHandle>, Win32Error> {
    let mut windows: Vec<WindowHandle> = Vec::new();

    // SAFETY: EnumWindows calls our callback for each top-level window,
    // synchronously, with a pointer to our Vec passed through as LPARAM.
    // The Vec outlives the call.
    unsafe {
        EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut windows as *mut _ as isize),
        )
        .map_err(|e| Win32Error::EnumerationFailed(e.to_string()))?;
    }

    Ok(windows)
}

/// Callback invoked by `EnumWindows` for each top-level window.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec<WindowHandle> pointer from enumerate_windows.
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    windows.push(WindowHandle::from_hwnd(hwnd));
    BOOL(1) // TRUE, continue enumerating
}

/// One toggle's view of the desktop: the live window stack plus the monitor
/// list it is filtered against.
pub struct Win32Desktop {
    monitors: Vec<MonitorInfo>,
}

impl Win32Desktop {
    /// Captures a desktop view against the given monitors.
    pub fn new(monitors: &[MonitorInfo]) -> Self {
        Self {
            monitors: monitors.to_vec(),
        }
    }
}

impl Desktop for Win32Desktop {
    type Window = WindowHandle;

    fn windows(&self) -> Vec<WindowHandle> {
        match enumerate_windows() {
            Ok(windows) => windows,
            Err(e) => {
                // A failed enumeration yields an empty set; the toggle then
                // runs a harmless empty minimize pass instead of acting on
                // a partial stack.
                tracing::warn!("Window enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    fn bottom_window(&self) -> Option<WindowHandle> {
        // SAFETY: GetTopWindow(None) yields the top of the stack;
        // GW_HWNDLAST from there is the bottommost window.
        unsafe {
            let top = GetTopWindow(None).ok()?;
            let bottom = GetWindow(top, GW_HWNDLAST).ok()?;
            Some(WindowHandle::from_hwnd(bottom))
        }
    }

    fn window_above(&self, window: &WindowHandle) -> Option<WindowHandle> {
        // SAFETY: GetWindow walks the Z-order links; it errors at the top
        // of the stack and for destroyed windows.
        let above = unsafe { GetWindow(window.hwnd(), GW_HWNDPREV) }.ok()?;
        if above.is_invalid() {
            return None;
        }
        Some(WindowHandle::from_hwnd(above))
    }

    fn monitor_of(&self, window: &WindowHandle) -> Option<MonitorIndex> {
        let handle = window.monitor_handle();
        self.monitors.iter().position(|m| m.handle == handle)
    }
}
