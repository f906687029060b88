//! The HWND wrapper.
//!
//! [`WindowHandle`] stores the raw handle value rather than an `HWND` so it
//! is `Copy + Send` and can live inside daemon state. Every query hits the
//! live window; when the window has been destroyed in the meantime the OS
//! calls return zero/false/empty and actions become no-ops, which is exactly
//! the behavior the toggle logic expects.

use std::ffi::c_void;

use showdesk_core::{DesktopWindow, ExStyleFlags, Rect, StyleFlags};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_CLOAKED};
use windows::Win32::Graphics::Gdi::{MonitorFromWindow, MONITOR_DEFAULTTONEAREST};
use windows::Win32::UI::Input::KeyboardAndMouse::{keybd_event, KEYBD_EVENT_FLAGS};
use windows::Win32::UI::WindowsAndMessaging::{
    GetAncestor, GetLastActivePopup, GetWindowLongPtrW, GetWindowPlacement, GetWindowRect,
    GetWindowTextLengthW, GetWindowTextW, IsWindowVisible, SetForegroundWindow, ShowWindow,
    GA_ROOTOWNER, GWL_EXSTYLE, GWL_STYLE, SW_RESTORE, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED,
    SW_SHOWNORMAL, WINDOWPLACEMENT, WS_DISABLED, WS_EX_APPWINDOW, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_MINIMIZE, WS_VISIBLE,
};

use crate::Win32Error;

/// Opaque handle to one top-level window. Equality is the raw handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub fn from_hwnd(hwnd: HWND) -> Self {
        Self(hwnd.0 as isize)
    }

    /// The raw HWND value, for logging and IPC.
    pub fn raw(&self) -> isize {
        self.0
    }

    pub(crate) fn hwnd(&self) -> HWND {
        HWND(self.0 as *mut c_void)
    }

    /// The window title, empty for destroyed or untitled windows.
    pub fn title(&self) -> String {
        // SAFETY: text queries read window state with a caller-owned buffer.
        unsafe {
            let length = GetWindowTextLengthW(self.hwnd());
            if length == 0 {
                return String::new();
            }

            // +1 for the null terminator that Windows requires
            let mut buffer = vec![0u16; (length + 1) as usize];
            let copied = GetWindowTextW(self.hwnd(), &mut buffer);
            String::from_utf16_lossy(&buffer[..copied as usize])
        }
    }

    /// The window rectangle.
    ///
    /// For normal and minimized windows the cached placement rectangle is
    /// authoritative and cheaper. For maximized windows the placement holds
    /// the pre-maximize rectangle, so the live rectangle is queried instead.
    /// Any other show state fails this single query; callers drop the
    /// window from the operation at hand.
    pub fn rect(&self) -> Result<Rect, Win32Error> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        // A destroyed window leaves the placement zeroed; showCmd 0 then
        // lands in the unexpected-state arm below.
        // SAFETY: GetWindowPlacement fills the struct; cbSize is set.
        let _ = unsafe { GetWindowPlacement(self.hwnd(), &mut placement) };

        let show_cmd = placement.showCmd;
        if show_cmd == SW_SHOWNORMAL.0 as u32 || show_cmd == SW_SHOWMINIMIZED.0 as u32 {
            Ok(rect_from_win32(
                placement.rcNormalPosition.left,
                placement.rcNormalPosition.top,
                placement.rcNormalPosition.right,
                placement.rcNormalPosition.bottom,
            ))
        } else if show_cmd == SW_SHOWMAXIMIZED.0 as u32 {
            let mut rect = windows::Win32::Foundation::RECT::default();
            // SAFETY: GetWindowRect writes the live window rectangle.
            let _ = unsafe { GetWindowRect(self.hwnd(), &mut rect) };
            Ok(rect_from_win32(rect.left, rect.top, rect.right, rect.bottom))
        } else {
            Err(Win32Error::UnexpectedShowState {
                hwnd: self.0,
                show_cmd,
            })
        }
    }

    /// Raw HMONITOR value of the monitor nearest to the window.
    pub fn monitor_handle(&self) -> isize {
        // SAFETY: MonitorFromWindow is a pure query.
        unsafe { MonitorFromWindow(self.hwnd(), MONITOR_DEFAULTTONEAREST).0 as isize }
    }

    /// Makes this window the foreground window, restoring it first when it
    /// is minimized. Fire-and-forget.
    pub fn bring_to_foreground(&self) {
        if self.style_flags().minimized {
            // SAFETY: ShowWindow with a valid command is safe; a dead
            // handle makes it a no-op.
            unsafe {
                let _ = ShowWindow(self.hwnd(), SW_RESTORE);
            }
        }
        // SAFETY: the empty keyboard event marks this process as the last
        // input source so the foreground switch is not rejected.
        unsafe {
            keybd_event(0, 0, KEYBD_EVENT_FLAGS(0), 0);
            let _ = SetForegroundWindow(self.hwnd());
        }
    }

    fn raw_style(&self) -> u32 {
        // SAFETY: GetWindowLongPtrW reads a window attribute; returns 0 for
        // destroyed windows.
        unsafe { GetWindowLongPtrW(self.hwnd(), GWL_STYLE) as u32 }
    }

    fn raw_ex_style(&self) -> u32 {
        // SAFETY: as above.
        unsafe { GetWindowLongPtrW(self.hwnd(), GWL_EXSTYLE) as u32 }
    }
}

impl DesktopWindow for WindowHandle {
    fn style_flags(&self) -> StyleFlags {
        decode_style(self.raw_style())
    }

    fn ex_style_flags(&self) -> ExStyleFlags {
        decode_ex_style(self.raw_ex_style())
    }

    fn is_cloaked(&self) -> bool {
        let mut cloaked: u32 = 0;
        // SAFETY: DwmGetWindowAttribute writes into our u32; a failed call
        // (destroyed window, DWM off) leaves it 0 = not cloaked.
        let result = unsafe {
            DwmGetWindowAttribute(
                self.hwnd(),
                DWMWA_CLOAKED,
                &mut cloaked as *mut u32 as *mut c_void,
                std::mem::size_of::<u32>() as u32,
            )
        };
        result.is_ok() && cloaked != 0
    }

    fn is_shown(&self) -> bool {
        // SAFETY: IsWindowVisible is a simple query returning a BOOL.
        unsafe { IsWindowVisible(self.hwnd()).as_bool() }
    }

    fn root_owner(&self) -> Self {
        // SAFETY: GetAncestor returns the window itself for unowned
        // windows and null for destroyed ones; both are safe to wrap.
        let owner = unsafe { GetAncestor(self.hwnd(), GA_ROOTOWNER) };
        Self::from_hwnd(owner)
    }

    fn last_active_popup(&self) -> Self {
        // SAFETY: pure query; returns the window itself when it has no
        // popups.
        let popup = unsafe { GetLastActivePopup(self.hwnd()) };
        Self::from_hwnd(popup)
    }

    fn minimize(&self) {
        if self.style_flags().visible {
            // SAFETY: ShowWindow on a dead handle is a no-op.
            unsafe {
                let _ = ShowWindow(self.hwnd(), SW_SHOWMINIMIZED);
            }
        }
    }

    fn restore(&self) {
        if self.style_flags().minimized {
            // SAFETY: as above.
            unsafe {
                let _ = ShowWindow(self.hwnd(), SW_RESTORE);
            }
        }
    }
}

/// Decodes the WS_* bits the classifier cares about.
pub(crate) fn decode_style(raw: u32) -> StyleFlags {
    StyleFlags {
        disabled: raw & WS_DISABLED.0 != 0,
        visible: raw & WS_VISIBLE.0 != 0,
        minimized: raw & WS_MINIMIZE.0 != 0,
    }
}

/// Decodes the WS_EX_* bits the classifier cares about.
pub(crate) fn decode_ex_style(raw: u32) -> ExStyleFlags {
    ExStyleFlags {
        no_activate: raw & WS_EX_NOACTIVATE.0 != 0,
        app_window: raw & WS_EX_APPWINDOW.0 != 0,
        tool_window: raw & WS_EX_TOOLWINDOW.0 != 0,
    }
}

fn rect_from_win32(left: i32, top: i32, right: i32, bottom: i32) -> Rect {
    Rect::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_style_extracts_each_bit() {
        let flags = decode_style(WS_DISABLED.0 | WS_VISIBLE.0 | WS_MINIMIZE.0);
        assert!(flags.disabled);
        assert!(flags.visible);
        assert!(flags.minimized);

        let flags = decode_style(WS_VISIBLE.0);
        assert!(!flags.disabled);
        assert!(flags.visible);
        assert!(!flags.minimized);

        assert_eq!(decode_style(0), StyleFlags::default());
    }

    #[test]
    fn decode_ex_style_extracts_each_bit() {
        let flags = decode_ex_style(WS_EX_NOACTIVATE.0 | WS_EX_APPWINDOW.0 | WS_EX_TOOLWINDOW.0);
        assert!(flags.no_activate);
        assert!(flags.app_window);
        assert!(flags.tool_window);

        let flags = decode_ex_style(WS_EX_TOOLWINDOW.0);
        assert!(!flags.no_activate);
        assert!(!flags.app_window);
        assert!(flags.tool_window);
    }

    #[test]
    fn style_families_do_not_bleed_into_each_other() {
        // WS_EX_NOACTIVATE and WS_DISABLED share the numeric value
        // 0x08000000; decoding must keep the two families apart.
        assert_eq!(WS_EX_NOACTIVATE.0, WS_DISABLED.0);
        let style = decode_style(WS_EX_APPWINDOW.0);
        assert!(!style.disabled && !style.visible && !style.minimized);
    }

    #[test]
    fn rect_conversion_uses_width_and_height() {
        let rect = rect_from_win32(10, 20, 110, 220);
        assert_eq!(rect, Rect::new(10, 20, 100, 200));
    }

    #[test]
    fn handle_equality_is_raw_value() {
        let a = WindowHandle(0x1234);
        let b = WindowHandle(0x1234);
        let c = WindowHandle(0x5678);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
