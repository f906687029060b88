//! Per-monitor minimize/restore state machine.
//!
//! Each monitor is either `Empty` (no pending restore) or holds a saved
//! snapshot of the windows that were minimized, ordered topmost-first. The
//! toggle decision compares the live window set against the snapshot by
//! handle identity: when the only detected change is "things got minimized
//! since we last saved", the snapshot is replayed in reverse; any other
//! difference starts a fresh minimize pass.

use thiserror::Error;

use crate::classify::find_windows;
use crate::window::{Desktop, DesktopWindow, MonitorIndex, StyleCategory, WindowRecord};

/// Errors surfaced by a toggle. These fail the current toggle only; saved
/// state for every other monitor is untouched.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("monitor index {index} is out of range ({count} monitors tracked)")]
    UnknownMonitor { index: usize, count: usize },
}

/// What a completed toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome<W> {
    /// A minimize pass ran; `windows` received a minimize call.
    Minimized { windows: usize },
    /// The saved snapshot was replayed; `windows` received a restore call.
    Restored {
        windows: usize,
        /// The originally topmost window, restored last and therefore back
        /// on top; the natural candidate for the foreground.
        foreground: Option<W>,
    },
}

/// Returns the window's 0-based depth from the bottom of the global stack,
/// or `None` when the window is no longer in it.
///
/// Linear walk over "window above" links: O(n) per query, O(n²) per toggle.
/// Fine for the tens of windows a monitor realistically holds.
pub fn z_order_index<D: Desktop>(desktop: &D, window: &D::Window) -> Option<usize> {
    let mut depth = 0;
    let mut cursor = desktop.bottom_window();
    while let Some(current) = cursor {
        if current == *window {
            return Some(depth);
        }
        cursor = desktop.window_above(&current);
        depth += 1;
    }
    None
}

/// Owns the per-monitor toggle state for the lifetime of the process.
///
/// One slot per monitor index, created empty at startup and reset wholesale
/// when the monitor topology changes.
#[derive(Debug)]
pub struct ToggleController<W> {
    saved: Vec<Option<Vec<WindowRecord<W>>>>,
}

impl<W: DesktopWindow> ToggleController<W> {
    /// Creates a controller with an empty slot per monitor.
    pub fn new(monitor_count: usize) -> Self {
        Self {
            saved: (0..monitor_count).map(|_| None).collect(),
        }
    }

    /// Number of monitors tracked.
    pub fn monitor_count(&self) -> usize {
        self.saved.len()
    }

    /// Whether the monitor has a snapshot waiting to be restored.
    pub fn has_saved(&self, monitor: MonitorIndex) -> bool {
        self.saved.get(monitor).is_some_and(|slot| slot.is_some())
    }

    /// Number of monitors with a pending restore.
    pub fn pending_restores(&self) -> usize {
        self.saved.iter().filter(|slot| slot.is_some()).count()
    }

    /// Drops all saved snapshots and resizes to the new monitor count.
    ///
    /// Saved handles from before a topology change may refer to windows
    /// that moved monitors, so stale snapshots are not worth keeping.
    pub fn reset_monitors(&mut self, monitor_count: usize) {
        self.saved = (0..monitor_count).map(|_| None).collect();
    }

    /// Runs one full toggle for the given monitor: enumerate, classify,
    /// filter to the monitor, then minimize or restore.
    ///
    /// Completes synchronously before returning; callers serialize toggles
    /// by construction (one event at a time).
    pub fn handle_toggle_requested<D>(
        &mut self,
        desktop: &D,
        monitor: MonitorIndex,
    ) -> Result<ToggleOutcome<W>, ToggleError>
    where
        D: Desktop<Window = W>,
    {
        if monitor >= self.saved.len() {
            return Err(ToggleError::UnknownMonitor {
                index: monitor,
                count: self.saved.len(),
            });
        }

        let records: Vec<WindowRecord<W>> = find_windows(desktop)
            .applications
            .into_iter()
            .filter(|window| desktop.monitor_of(window) == Some(monitor))
            .map(WindowRecord::capture)
            .collect();

        if self.should_restore(monitor, &records) {
            Ok(self.restore_saved(monitor))
        } else {
            Ok(self.minimize_visible(desktop, monitor, records))
        }
    }

    /// Restore only when every live window is non-visible and the live set
    /// matches the snapshot by handle with nothing but style drift. A new
    /// or vanished handle always forces a fresh minimize pass.
    fn should_restore(&self, monitor: MonitorIndex, records: &[WindowRecord<W>]) -> bool {
        let Some(saved) = &self.saved[monitor] else {
            return false;
        };

        records
            .iter()
            .all(|record| record.style() != StyleCategory::Visible)
            && differs_only_by_style(records, saved)
    }

    /// Minimizes every visible window on the monitor, topmost first, and
    /// saves the full ordered set (pre-minimize styles included) so the
    /// reverse replay can rebuild the stacking order.
    fn minimize_visible<D>(
        &mut self,
        desktop: &D,
        monitor: MonitorIndex,
        records: Vec<WindowRecord<W>>,
    ) -> ToggleOutcome<W>
    where
        D: Desktop<Window = W>,
    {
        let mut ordered: Vec<(Option<usize>, WindowRecord<W>)> = records
            .into_iter()
            .map(|record| (z_order_index(desktop, record.window()), record))
            .collect();
        // Descending depth = topmost first; windows that vanished from the
        // stack (None) sort last.
        ordered.sort_by(|a, b| b.0.cmp(&a.0));

        let records: Vec<WindowRecord<W>> =
            ordered.into_iter().map(|(_, record)| record).collect();

        let mut minimized = 0;
        for record in &records {
            if record.style() == StyleCategory::Visible {
                record.window().minimize();
                minimized += 1;
            }
        }

        self.saved[monitor] = Some(records);
        ToggleOutcome::Minimized { windows: minimized }
    }

    /// Replays the saved snapshot back-to-front so the originally topmost
    /// window is restored last and ends up on top again. The monitor goes
    /// back to empty no matter how many restores actually land.
    fn restore_saved(&mut self, monitor: MonitorIndex) -> ToggleOutcome<W> {
        let saved = self.saved[monitor].take().unwrap_or_default();

        let mut restored = 0;
        for record in saved.iter().rev() {
            if record.style() == StyleCategory::Visible {
                record.window().restore();
                restored += 1;
            }
        }

        // First Visible record in saved (topmost-first) order = the window
        // restored last.
        let foreground = saved
            .iter()
            .find(|record| record.style() == StyleCategory::Visible)
            .map(|record| record.window().clone());

        ToggleOutcome::Restored {
            windows: restored,
            foreground,
        }
    }
}

/// Same handles, same count, and at least one captured style differs.
fn differs_only_by_style<W: DesktopWindow>(
    new: &[WindowRecord<W>],
    saved: &[WindowRecord<W>],
) -> bool {
    if new.len() != saved.len() {
        return false;
    }
    // Record equality is handle identity, so `contains` ignores style.
    if !new.iter().all(|record| saved.contains(record)) {
        return false;
    }
    new.iter().any(|record| {
        saved
            .iter()
            .find(|old| old.is_same_window(record))
            .is_some_and(|old| old.style() != record.style())
    })
}
