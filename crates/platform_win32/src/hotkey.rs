//! Global hotkey registration.
//!
//! `RegisterHotKey` ties the registration to the calling thread's message
//! queue, so all hotkeys live on one dedicated background thread that pumps
//! messages and forwards `WM_HOTKEY` over a channel. The returned
//! [`HotkeyHandle`] posts `WM_QUIT` to that thread on drop, which
//! unregisters everything and joins cleanly.

use std::sync::mpsc;

use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
    MOD_SHIFT, MOD_WIN, VK_END, VK_ESCAPE, VK_F1, VK_HOME, VK_OEM_3, VK_PAUSE, VK_SPACE, VK_TAB,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PostThreadMessageW, MSG, WM_HOTKEY, WM_QUIT,
};

use crate::Win32Error;

/// Identifier for a registered hotkey, echoed back in events.
pub type HotkeyId = i32;

/// A hotkey definition: modifier bitmask plus virtual-key code, both in
/// Win32 terms.
#[derive(Debug, Clone, Copy)]
pub struct Hotkey {
    pub id: HotkeyId,
    pub modifiers: u32,
    pub vk: u32,
}

impl Hotkey {
    pub fn new(id: HotkeyId, modifiers: u32, vk: u32) -> Self {
        Self { id, modifiers, vk }
    }
}

/// A hotkey press, delivered on the receiver side of `register_hotkeys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyEvent {
    pub id: HotkeyId,
}

/// Keeps the hotkey thread alive; dropping it unregisters all hotkeys.
pub struct HotkeyHandle {
    thread: Option<std::thread::JoinHandle<()>>,
    thread_id: u32,
    registered: usize,
}

impl HotkeyHandle {
    /// Number of hotkeys that registered successfully.
    pub fn registered_count(&self) -> usize {
        self.registered
    }
}

impl Drop for HotkeyHandle {
    fn drop(&mut self) {
        // SAFETY: posting WM_QUIT to our own worker thread ends its message
        // pump; the join below then completes promptly.
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Registers the given hotkeys on a dedicated message-pump thread.
///
/// Returns the handle plus the receiver that presses arrive on. Individual
/// registrations that fail (typically a collision with another application)
/// are logged and skipped; the call errors only when none succeed.
pub fn register_hotkeys(
    hotkeys: Vec<Hotkey>,
) -> Result<(HotkeyHandle, mpsc::Receiver<HotkeyEvent>), Win32Error> {
    let (event_tx, event_rx) = mpsc::channel::<HotkeyEvent>();
    let (init_tx, init_rx) = mpsc::channel::<Result<(u32, usize), Win32Error>>();

    let thread = std::thread::Builder::new()
        .name("hotkey".to_string())
        .spawn(move || {
            // SAFETY: thread id of the current thread, used by the handle
            // to post WM_QUIT here.
            let thread_id = unsafe { GetCurrentThreadId() };

            let mut registered: Vec<HotkeyId> = Vec::new();
            for hotkey in &hotkeys {
                // SAFETY: RegisterHotKey binds a system-wide hotkey to this
                // thread's message queue; ids are unique per caller.
                let result = unsafe {
                    RegisterHotKey(
                        None,
                        hotkey.id,
                        HOT_KEY_MODIFIERS(hotkey.modifiers) | MOD_NOREPEAT,
                        hotkey.vk,
                    )
                };
                match result {
                    Ok(()) => registered.push(hotkey.id),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to register hotkey {} (vk=0x{:02X}): {}",
                            hotkey.id,
                            hotkey.vk,
                            e
                        );
                    }
                }
            }

            if registered.is_empty() {
                let _ = init_tx.send(Err(Win32Error::HotkeyRegistrationFailed(
                    "no hotkey could be registered".to_string(),
                )));
                return;
            }
            let _ = init_tx.send(Ok((thread_id, registered.len())));

            let mut msg = MSG::default();
            // GetMessageW returns 0 on WM_QUIT and -1 on error; both end
            // the pump.
            // SAFETY: standard message pump on our own queue.
            while unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 > 0 {
                if msg.message == WM_HOTKEY {
                    let event = HotkeyEvent {
                        id: msg.wParam.0 as i32,
                    };
                    if event_tx.send(event).is_err() {
                        break; // Receiver dropped, daemon is shutting down
                    }
                }
            }

            for id in registered {
                // SAFETY: unregistering on the thread that registered.
                unsafe {
                    let _ = UnregisterHotKey(None, id);
                }
            }
        })
        .map_err(|e| Win32Error::HotkeyRegistrationFailed(e.to_string()))?;

    match init_rx.recv() {
        Ok(Ok((thread_id, registered))) => Ok((
            HotkeyHandle {
                thread: Some(thread),
                thread_id,
                registered,
            },
            event_rx,
        )),
        Ok(Err(e)) => {
            let _ = thread.join();
            Err(e)
        }
        Err(_) => Err(Win32Error::HotkeyRegistrationFailed(
            "hotkey thread exited during setup".to_string(),
        )),
    }
}

/// Parses a hotkey string like `"win+alt+d"` into (modifier bitmask,
/// virtual-key code). Case-insensitive; exactly one non-modifier key is
/// required.
pub fn parse_hotkey_string(spec: &str) -> Option<(u32, u32)> {
    let mut modifiers = 0u32;
    let mut key: Option<u32> = None;

    for part in spec.split('+') {
        let part = part.trim().to_ascii_lowercase();
        match part.as_str() {
            "" => return None,
            "win" | "super" => modifiers |= MOD_WIN.0,
            "ctrl" | "control" => modifiers |= MOD_CONTROL.0,
            "alt" => modifiers |= MOD_ALT.0,
            "shift" => modifiers |= MOD_SHIFT.0,
            name => {
                if key.is_some() {
                    return None;
                }
                key = Some(vk_from_name(name)?);
            }
        }
    }

    Some((modifiers, key?))
}

/// Resolves a lowercase key name to its virtual-key code.
fn vk_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Letter and digit key codes equal their uppercase ASCII value.
        if c.is_ascii_alphanumeric() {
            return Some(c.to_ascii_uppercase() as u32);
        }
        return None;
    }

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
        if (1..=24).contains(&n) {
            return Some(VK_F1.0 as u32 + n - 1);
        }
        return None;
    }

    let vk = match name {
        "space" => VK_SPACE,
        "tab" => VK_TAB,
        "escape" | "esc" => VK_ESCAPE,
        "home" => VK_HOME,
        "end" => VK_END,
        "pause" => VK_PAUSE,
        "grave" | "backtick" => VK_OEM_3,
        _ => return None,
    };
    Some(vk.0 as u32)
}
