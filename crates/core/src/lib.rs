//! ShowDesk Core
//!
//! Platform-agnostic window classification and per-monitor toggle logic.
//!
//! The crate sees the OS desktop only through two traits ([`DesktopWindow`]
//! for per-window queries and actions, [`Desktop`] for the stack as a whole)
//! so every decision, from which windows count as user-visible applications
//! to whether a press should minimize or restore, can be exercised without a
//! live window system.

mod classify;
mod toggle;
mod window;

#[cfg(test)]
pub(crate) mod fake;

pub use classify::{classify, find_windows, ClassifiedWindows, WindowClass};
pub use toggle::{z_order_index, ToggleController, ToggleError, ToggleOutcome};
pub use window::{
    Desktop, DesktopWindow, ExStyleFlags, MonitorIndex, StyleCategory, StyleFlags, WindowRecord,
};

use serde::{Deserialize, Serialize};

/// A rectangle in screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
