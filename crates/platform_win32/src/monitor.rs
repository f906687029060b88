//! Monitor enumeration and cursor-to-monitor resolution.

use std::ffi::c_void;

use showdesk_core::{MonitorIndex, Rect};
use windows::Win32::Foundation::{BOOL, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, MonitorFromPoint, HDC, HMONITOR, MONITORINFO,
    MONITORINFOEXW, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

use crate::Win32Error;

/// MONITORINFO.dwFlags bit marking the primary monitor.
const MONITORINFOF_PRIMARY: u32 = 1;

/// One attached monitor. The `index` is the position in enumeration order
/// and is what the toggle state is keyed on.
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub index: MonitorIndex,
    /// Raw HMONITOR value.
    pub handle: isize,
    /// Full monitor rectangle.
    pub rect: Rect,
    /// Monitor rectangle minus taskbar and docked toolbars.
    pub work_area: Rect,
    pub is_primary: bool,
    /// Device name, e.g. `\\.\DISPLAY1`. Stable across reboots, unlike the
    /// HMONITOR value.
    pub device_name: String,
}

/// Enumerates all attached monitors in OS order.
pub fn enumerate_monitors() -> Result<Vec<MonitorInfo>, Win32Error> {
    let mut handles: Vec<isize> = Vec::new();

    // SAFETY: EnumDisplayMonitors calls our callback synchronously for each
    // monitor; the Vec pointer passed as LPARAM outlives the call.
    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut handles as *mut _ as isize),
        )
    };
    if !ok.as_bool() {
        return Err(Win32Error::MonitorEnumerationFailed(
            "EnumDisplayMonitors returned FALSE".to_string(),
        ));
    }

    let monitors = handles
        .into_iter()
        .enumerate()
        .filter_map(|(index, handle)| query_monitor(index, handle))
        .collect();
    Ok(monitors)
}

unsafe extern "system" fn enum_monitor_callback(
    monitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    // SAFETY: lparam is the Vec<isize> pointer from enumerate_monitors.
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<isize>) };
    handles.push(monitor.0 as isize);
    BOOL(1)
}

/// Fills in rectangle, primary flag, and device name for one monitor.
/// Returns `None` when the monitor vanished between enumeration and query.
fn query_monitor(index: usize, handle: isize) -> Option<MonitorInfo> {
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

    // SAFETY: MONITORINFOEXW starts with a MONITORINFO whose cbSize
    // announces the extended layout, so the cast is valid.
    let ok = unsafe {
        GetMonitorInfoW(
            HMONITOR(handle as *mut c_void),
            &mut info as *mut MONITORINFOEXW as *mut MONITORINFO,
        )
    };
    if !ok.as_bool() {
        return None;
    }

    let device_len = info
        .szDevice
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(info.szDevice.len());

    Some(MonitorInfo {
        index,
        handle,
        rect: rect_from_win32(info.monitorInfo.rcMonitor),
        work_area: rect_from_win32(info.monitorInfo.rcWork),
        is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
        device_name: String::from_utf16_lossy(&info.szDevice[..device_len]),
    })
}

/// The current cursor position in screen coordinates.
pub fn cursor_position() -> Option<(i32, i32)> {
    let mut point = POINT::default();
    // SAFETY: GetCursorPos writes into our POINT.
    unsafe { GetCursorPos(&mut point).ok()? };
    Some((point.x, point.y))
}

/// Index of the monitor under the cursor, resolved against the given
/// monitor list. `None` when the cursor query fails or the resolved
/// monitor is not in the list (topology drifted since enumeration).
pub fn monitor_index_at_cursor(monitors: &[MonitorInfo]) -> Option<MonitorIndex> {
    let (x, y) = cursor_position()?;
    // SAFETY: MonitorFromPoint is a pure query.
    let handle =
        unsafe { MonitorFromPoint(POINT { x, y }, MONITOR_DEFAULTTONEAREST).0 as isize };
    monitor_index_for_handle(monitors, handle)
}

/// Looks a raw HMONITOR value up in the enumerated list.
fn monitor_index_for_handle(monitors: &[MonitorInfo], handle: isize) -> Option<MonitorIndex> {
    monitors.iter().position(|m| m.handle == handle)
}

fn rect_from_win32(rect: RECT) -> Rect {
    Rect::new(
        rect.left,
        rect.top,
        rect.right - rect.left,
        rect.bottom - rect.top,
    )
}
