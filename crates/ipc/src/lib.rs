//! ShowDesk IPC Protocol
//!
//! Shared types for daemon-CLI communication over Windows named pipes.
//! Messages are single lines of JSON, newline-terminated.

use serde::{Deserialize, Serialize};

/// Named pipe path for IPC communication.
pub const PIPE_NAME: &str = r"\\.\pipe\showdesk";

/// Upper bound on a single IPC message; clients sending more are cut off.
pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024;

/// Commands that can be sent from the CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    /// Toggle the desktop on a monitor. `None` means the monitor currently
    /// under the cursor.
    Toggle {
        /// Monitor index in enumeration order.
        monitor: Option<usize>,
    },
    /// Query daemon status.
    QueryStatus,
    /// Query the attached monitors and their toggle state.
    QueryMonitors,
    /// Query the application windows the classifier currently sees.
    QueryWindows,
    /// Reload configuration from file.
    Reload,
    /// Stop the daemon.
    Stop,
}

/// What a toggle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Minimized,
    Restored,
}

/// Show state of a window as reported over IPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStyle {
    Disabled,
    Minimized,
    Visible,
}

/// A rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IpcRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One attached monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorEntry {
    /// Index in enumeration order; what `Toggle { monitor }` refers to.
    pub index: usize,
    /// Device name, e.g. `\\.\DISPLAY1`.
    pub device_name: String,
    pub rect: IpcRect,
    pub work_area: IpcRect,
    pub is_primary: bool,
    /// Whether the monitor holds a snapshot waiting to be restored.
    pub pending_restore: bool,
}

/// One application window as the classifier sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    /// Raw HWND value.
    pub handle: isize,
    pub title: String,
    /// Monitor index, `None` when the window is on no known monitor.
    pub monitor: Option<usize>,
    /// Depth from the bottom of the global Z-order, `None` when the window
    /// vanished from the stack.
    pub z_index: Option<usize>,
    pub style: WindowStyle,
    pub rect: IpcRect,
}

/// Responses from the daemon to the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed with an error.
    Error {
        /// Error message describing what went wrong.
        message: String,
    },
    /// Outcome of a toggle.
    ToggleResult {
        /// Monitor the toggle ran on.
        monitor: usize,
        /// Whether windows were minimized or restored.
        action: ToggleAction,
        /// Number of windows that received the action.
        windows: usize,
    },
    /// Daemon status query response.
    StatusInfo {
        version: String,
        monitors: usize,
        /// Monitors with a snapshot waiting to be restored.
        pending_restores: usize,
        uptime_seconds: u64,
    },
    /// Monitor query response.
    MonitorList { monitors: Vec<MonitorEntry> },
    /// Window query response.
    WindowList { windows: Vec<WindowEntry> },
}

impl IpcResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
