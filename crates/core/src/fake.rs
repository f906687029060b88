//! In-memory desktop fakes for unit tests.
//!
//! A [`FakeDesktop`] holds a mutable window stack behind an `Rc<RefCell<..>>`
//! so its [`FakeWindow`] handles behave like live OS handles: cheap to copy,
//! equal by identity, and pointing at state that changes underneath them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::window::{
    Desktop, DesktopWindow, ExStyleFlags, MonitorIndex, StyleCategory, StyleFlags,
};

/// Mutable per-window state inside the fake desktop.
#[derive(Debug, Clone, Default)]
pub(crate) struct WindowState {
    pub style: StyleFlags,
    pub ex_style: ExStyleFlags,
    pub cloaked: bool,
    /// Live OS visibility (IsWindowVisible), distinct from the style bit.
    pub shown: bool,
    /// Root owner id; `None` means the window owns itself.
    pub owner: Option<u64>,
    /// Last active popup id; `None` means the window itself.
    pub popup: Option<u64>,
    pub monitor: Option<MonitorIndex>,
}

#[derive(Debug, Default)]
struct State {
    /// Top-to-bottom Z-order of live windows.
    order: Vec<u64>,
    windows: HashMap<u64, WindowState>,
    minimized_log: Vec<u64>,
    restored_log: Vec<u64>,
}

/// A scriptable window stack.
pub(crate) struct FakeDesktop {
    state: Rc<RefCell<State>>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Adds a window at the bottom of the stack and configures it through
    /// the closure.
    pub fn add_window(&self, id: u64, configure: impl FnOnce(&mut WindowState)) -> FakeWindow {
        let mut window = WindowState::default();
        configure(&mut window);

        let mut state = self.state.borrow_mut();
        state.order.push(id);
        state.windows.insert(id, window);

        FakeWindow {
            id,
            state: Rc::clone(&self.state),
        }
    }

    /// Adds a typical visible application window on the given monitor.
    pub fn add_app(&self, id: u64, monitor: MonitorIndex) -> FakeWindow {
        self.add_window(id, |w| {
            w.style.visible = true;
            w.ex_style.app_window = true;
            w.shown = true;
            w.monitor = Some(monitor);
        })
    }

    /// Simulates the window being destroyed: every later query returns
    /// defaults and every action becomes a no-op.
    pub fn remove_window(&self, id: u64) {
        let mut state = self.state.borrow_mut();
        state.order.retain(|&w| w != id);
        state.windows.remove(&id);
    }

    pub fn set_minimized(&self, id: u64, minimized: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&id) {
            window.style.minimized = minimized;
        }
    }

    /// Window ids in the order minimize() was invoked on them.
    pub fn minimized_log(&self) -> Vec<u64> {
        self.state.borrow().minimized_log.clone()
    }

    /// Window ids in the order restore() was invoked on them.
    pub fn restored_log(&self) -> Vec<u64> {
        self.state.borrow().restored_log.clone()
    }

    pub fn minimize_count(&self, id: u64) -> usize {
        self.state
            .borrow()
            .minimized_log
            .iter()
            .filter(|&&w| w == id)
            .count()
    }

    pub fn restore_count(&self, id: u64) -> usize {
        self.state
            .borrow()
            .restored_log
            .iter()
            .filter(|&&w| w == id)
            .count()
    }

    /// Current (id, style category) pairs in stack order.
    pub fn styles(&self) -> Vec<(u64, StyleCategory)> {
        let state = self.state.borrow();
        state
            .order
            .iter()
            .map(|id| {
                let style = state.windows[id].style;
                (*id, StyleCategory::from_flags(style))
            })
            .collect()
    }

    fn window(&self, id: u64) -> FakeWindow {
        FakeWindow {
            id,
            state: Rc::clone(&self.state),
        }
    }
}

/// Handle into a [`FakeDesktop`]. Equality is by id, mirroring HWND
/// identity semantics.
#[derive(Clone)]
pub(crate) struct FakeWindow {
    id: u64,
    state: Rc<RefCell<State>>,
}

impl FakeWindow {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for FakeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeWindow({})", self.id)
    }
}

impl PartialEq for FakeWindow {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FakeWindow {}

impl DesktopWindow for FakeWindow {
    fn style_flags(&self) -> StyleFlags {
        self.state
            .borrow()
            .windows
            .get(&self.id)
            .map(|w| w.style)
            .unwrap_or_default()
    }

    fn ex_style_flags(&self) -> ExStyleFlags {
        self.state
            .borrow()
            .windows
            .get(&self.id)
            .map(|w| w.ex_style)
            .unwrap_or_default()
    }

    fn is_cloaked(&self) -> bool {
        self.state
            .borrow()
            .windows
            .get(&self.id)
            .is_some_and(|w| w.cloaked)
    }

    fn is_shown(&self) -> bool {
        self.state
            .borrow()
            .windows
            .get(&self.id)
            .is_some_and(|w| w.shown)
    }

    fn root_owner(&self) -> Self {
        let owner = self
            .state
            .borrow()
            .windows
            .get(&self.id)
            .and_then(|w| w.owner)
            .unwrap_or(self.id);
        FakeWindow {
            id: owner,
            state: Rc::clone(&self.state),
        }
    }

    fn last_active_popup(&self) -> Self {
        let popup = self
            .state
            .borrow()
            .windows
            .get(&self.id)
            .and_then(|w| w.popup)
            .unwrap_or(self.id);
        FakeWindow {
            id: popup,
            state: Rc::clone(&self.state),
        }
    }

    fn minimize(&self) {
        let mut state = self.state.borrow_mut();
        match state.windows.get_mut(&self.id) {
            Some(window) => window.style.minimized = true,
            None => return, // destroyed window: no-op
        }
        state.minimized_log.push(self.id);
    }

    fn restore(&self) {
        let mut state = self.state.borrow_mut();
        match state.windows.get_mut(&self.id) {
            Some(window) => window.style.minimized = false,
            None => return, // destroyed window: no-op
        }
        state.restored_log.push(self.id);
    }
}

impl Desktop for FakeDesktop {
    type Window = FakeWindow;

    fn windows(&self) -> Vec<FakeWindow> {
        let order = self.state.borrow().order.clone();
        order.into_iter().map(|id| self.window(id)).collect()
    }

    fn bottom_window(&self) -> Option<FakeWindow> {
        let id = *self.state.borrow().order.last()?;
        Some(self.window(id))
    }

    fn window_above(&self, window: &FakeWindow) -> Option<FakeWindow> {
        let state = self.state.borrow();
        let position = state.order.iter().position(|&id| id == window.id)?;
        if position == 0 {
            return None;
        }
        let above = state.order[position - 1];
        drop(state);
        Some(self.window(above))
    }

    fn monitor_of(&self, window: &FakeWindow) -> Option<MonitorIndex> {
        self.state
            .borrow()
            .windows
            .get(&window.id)
            .and_then(|w| w.monitor)
    }
}
