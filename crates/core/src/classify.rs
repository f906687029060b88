//! Top-level window classification.
//!
//! Plain enumeration sees far more than the user does: tooltips, menus,
//! cloaked virtual-desktop placeholders, hidden helper windows. The rules
//! here mirror what the OS task switcher itself considers a real
//! application window, so the toggle only ever touches windows the user can
//! see and name.

use crate::window::{Desktop, DesktopWindow};

/// Result of classifying one top-level window. Closed set; recomputed on
/// every toggle and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// Not a user-visible window; dropped from all further processing.
    Hidden,
    /// A real application window.
    Application,
    /// A floating tool window (kept separate, never minimized by a toggle).
    Tool,
}

/// The enumerator's output: two disjoint sequences in enumeration order
/// (topmost first). Hidden windows appear in neither.
#[derive(Debug, Clone)]
pub struct ClassifiedWindows<W> {
    pub applications: Vec<W>,
    pub tools: Vec<W>,
}

/// Walks every top-level window once and buckets it by classification.
pub fn find_windows<D: Desktop>(desktop: &D) -> ClassifiedWindows<D::Window> {
    let mut found = ClassifiedWindows {
        applications: Vec::new(),
        tools: Vec::new(),
    };

    for window in desktop.windows() {
        match classify(&window) {
            WindowClass::Application => found.applications.push(window),
            WindowClass::Tool => found.tools.push(window),
            WindowClass::Hidden => {}
        }
    }

    found
}

/// Classifies a single window. First matching rule wins.
pub fn classify<W: DesktopWindow>(window: &W) -> WindowClass {
    if window.is_cloaked() {
        return WindowClass::Hidden;
    }

    let style = window.style_flags();
    if style.disabled {
        return WindowClass::Hidden;
    }
    if !style.visible {
        return WindowClass::Hidden;
    }

    let ex = window.ex_style_flags();
    if ex.no_activate {
        return WindowClass::Hidden;
    }
    if ex.app_window {
        return WindowClass::Application;
    }
    if ex.tool_window {
        return WindowClass::Tool;
    }

    if is_task_switcher_window(window) {
        WindowClass::Application
    } else {
        WindowClass::Hidden
    }
}

/// The task-switcher heuristic for windows that carry neither the
/// app-window nor the tool-window extended style: resolve the window's
/// owner chain to its last active visible popup and accept the window only
/// when the walk resolves back to it.
fn is_task_switcher_window<W: DesktopWindow>(window: &W) -> bool {
    last_active_visible_popup(window.root_owner()).as_ref() == Some(window)
}

/// Repeatedly resolves "last active popup" starting from `root` until an
/// OS-visible popup is found or the walk stabilizes on a window that is its
/// own last active popup.
fn last_active_visible_popup<W: DesktopWindow>(root: W) -> Option<W> {
    let mut walk = root;
    loop {
        let next = walk.last_active_popup();
        if next.is_shown() {
            return Some(next);
        }
        if next == walk {
            return None;
        }
        walk = next;
    }
}
