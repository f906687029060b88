//! ShowDesk Platform Win32
//!
//! Windows-specific window and desktop access using Win32 APIs.
//!
//! This crate handles:
//! - Window enumeration and per-window queries (styles, cloaking, placement)
//! - Minimize/restore/foreground actions
//! - Monitor enumeration and cursor-to-monitor resolution
//! - Global hotkey registration on a dedicated message-pump thread
//!
//! The core crate's [`showdesk_core::Desktop`] and
//! [`showdesk_core::DesktopWindow`] traits are implemented here for live
//! HWNDs; all decision logic stays in `showdesk-core`.

mod desktop;
mod hotkey;
mod monitor;
mod window;

pub use desktop::{enumerate_windows, Win32Desktop};
pub use hotkey::{
    parse_hotkey_string, register_hotkeys, Hotkey, HotkeyEvent, HotkeyHandle, HotkeyId,
};
pub use monitor::{cursor_position, enumerate_monitors, monitor_index_at_cursor, MonitorInfo};
pub use window::WindowHandle;

use thiserror::Error;

/// Errors that can occur during Win32 operations.
///
/// Per-window query and action failures are absorbed as no-ops and never
/// surface here; these variants cover the operations whose failure the
/// caller must know about.
#[derive(Debug, Error)]
pub enum Win32Error {
    #[error("Failed to enumerate windows: {0}")]
    EnumerationFailed(String),

    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumerationFailed(String),

    #[error("Failed to register hotkeys: {0}")]
    HotkeyRegistrationFailed(String),

    #[error("Window {hwnd:#x} reported unexpected show state {show_cmd}")]
    UnexpectedShowState { hwnd: isize, show_cmd: u32 },
}

/// Declares this process as per-monitor DPI aware (V2).
///
/// Without this, Windows scales coordinates based on the primary monitor's
/// DPI, which gives wrong cursor and monitor positions on mixed-DPI setups.
/// Must be called once at startup before any window or monitor query.
pub fn set_dpi_awareness() -> bool {
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // SAFETY: safe to call once at startup; fails when already set via
    // manifest, which is fine to ignore.
    unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_ok() }
}
