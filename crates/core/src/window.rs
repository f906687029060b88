//! Window-facing traits and per-window snapshot types.
//!
//! The rest of the crate only ever sees windows through [`DesktopWindow`] and
//! [`Desktop`]. The Win32 layer implements both for live HWNDs; tests
//! implement them with in-memory fakes.

use serde::{Deserialize, Serialize};

/// Index of a monitor in the platform's enumeration order.
pub type MonitorIndex = usize;

/// Style bits relevant to classification, decoded into plain booleans.
///
/// Style and extended-style flags are kept as two separate closed sets so
/// bits from one family can never be tested against the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleFlags {
    /// WS_DISABLED: the window rejects input.
    pub disabled: bool,
    /// WS_VISIBLE: the window has the visible style bit set.
    pub visible: bool,
    /// WS_MINIMIZE: the window is currently minimized.
    pub minimized: bool,
}

/// Extended-style bits relevant to classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExStyleFlags {
    /// WS_EX_NOACTIVATE: the window never becomes the foreground window.
    pub no_activate: bool,
    /// WS_EX_APPWINDOW: the window forces itself onto the taskbar.
    pub app_window: bool,
    /// WS_EX_TOOLWINDOW: the window is a floating toolbar.
    pub tool_window: bool,
}

/// The show state of a window, captured at snapshot time.
///
/// Minimized takes precedence over visible: a minimized window still carries
/// the visible style bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    /// Neither visible nor minimized.
    Disabled,
    /// Minimized to the taskbar.
    Minimized,
    /// Shown on screen.
    Visible,
}

impl StyleCategory {
    /// Derives the category from decoded style flags.
    pub fn from_flags(flags: StyleFlags) -> Self {
        if flags.minimized {
            StyleCategory::Minimized
        } else if flags.visible {
            StyleCategory::Visible
        } else {
            StyleCategory::Disabled
        }
    }
}

/// One top-level window as seen by the classification and toggle logic.
///
/// Equality is identity: two values are equal iff they refer to the same
/// underlying OS window. All queries and actions hit the live window; a
/// window destroyed concurrently yields default/empty query results and
/// turns actions into silent no-ops.
pub trait DesktopWindow: Clone + Eq {
    /// Decoded style flags.
    fn style_flags(&self) -> StyleFlags;

    /// Decoded extended-style flags.
    fn ex_style_flags(&self) -> ExStyleFlags;

    /// Whether the compositor reports the window as cloaked (hidden
    /// virtual-desktop or suspended-app windows that still claim WS_VISIBLE).
    fn is_cloaked(&self) -> bool;

    /// Live OS visibility, as used by the task-switcher popup walk.
    fn is_shown(&self) -> bool;

    /// The window's top-level owner (the window itself if unowned).
    fn root_owner(&self) -> Self;

    /// The most recently active popup of this window (the window itself if
    /// it has none).
    fn last_active_popup(&self) -> Self;

    /// Minimizes the window if it is currently shown.
    fn minimize(&self);

    /// Restores the window if it is currently minimized.
    fn restore(&self);
}

/// The OS window stack as a whole.
pub trait Desktop {
    type Window: DesktopWindow;

    /// All top-level windows in Z-order, topmost first.
    fn windows(&self) -> Vec<Self::Window>;

    /// The bottommost window of the stack, where the Z-order walk starts.
    fn bottom_window(&self) -> Option<Self::Window>;

    /// The window directly above `window`, or `None` at the top of the
    /// stack (or when `window` is no longer in it).
    fn window_above(&self, window: &Self::Window) -> Option<Self::Window>;

    /// The monitor the window is located on, or `None` when the window is
    /// gone or off every known monitor.
    fn monitor_of(&self, window: &Self::Window) -> Option<MonitorIndex>;
}

/// Snapshot of one window taken at classification time: the window plus the
/// show state it had back then.
#[derive(Debug, Clone)]
pub struct WindowRecord<W> {
    window: W,
    style: StyleCategory,
}

impl<W: DesktopWindow> WindowRecord<W> {
    /// Captures the window's current style category.
    pub fn capture(window: W) -> Self {
        let style = StyleCategory::from_flags(window.style_flags());
        Self { window, style }
    }

    /// The snapshotted window.
    pub fn window(&self) -> &W {
        &self.window
    }

    /// The style category at capture time. Not consulted by equality.
    pub fn style(&self) -> StyleCategory {
        self.style
    }

    /// Whether both records refer to the same OS window, regardless of any
    /// style drift between the two captures.
    pub fn is_same_window(&self, other: &Self) -> bool {
        self.window == other.window
    }
}

/// Records compare by window identity only; the captured style is compared
/// explicitly via [`WindowRecord::style`] where it matters.
impl<W: DesktopWindow> PartialEq for WindowRecord<W> {
    fn eq(&self, other: &Self) -> bool {
        self.window == other.window
    }
}

impl<W: DesktopWindow> Eq for WindowRecord<W> {}
