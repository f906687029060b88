//! System tray icon management for ShowDesk daemon.
//!
//! Provides a system tray icon with a context menu for common operations:
//! - Toggle the desktop on the monitor under the cursor
//! - Open / reload configuration
//! - Exit daemon

use std::sync::mpsc;
use thiserror::Error;
use tracing::{debug, info};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};

/// Menu item IDs for tray context menu.
mod menu_ids {
    pub const TOGGLE: &str = "toggle";
    pub const OPEN_CONFIG: &str = "open_config";
    pub const RELOAD: &str = "reload";
    pub const EXIT: &str = "exit";
}

/// Events emitted by the tray icon.
#[derive(Debug, Clone)]
pub enum TrayEvent {
    /// User clicked "Toggle Desktop" menu item.
    Toggle,
    /// User clicked "Open Config" menu item.
    OpenConfig,
    /// User clicked "Reload Config" menu item.
    Reload,
    /// User clicked "Exit" menu item.
    Exit,
}

/// Manages the system tray icon and context menu.
pub struct TrayManager {
    _tray: TrayIcon,
}

impl TrayManager {
    /// Create a new tray manager with icon and context menu.
    ///
    /// The provided sender will receive tray events when menu items are
    /// clicked. The sender is a std::sync::mpsc::Sender so it can be passed
    /// to the menu event thread.
    pub fn new(event_sender: mpsc::Sender<TrayEvent>) -> Result<Self, TrayError> {
        // Create context menu
        let menu = Menu::new();

        // Title item (disabled)
        let title = MenuItem::new("ShowDesk", false, None);
        menu.append(&title)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Separator
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Toggle Desktop
        let toggle = MenuItem::with_id(menu_ids::TOGGLE, "Toggle Desktop", true, None);
        menu.append(&toggle)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Separator
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Open Config
        let open_config = MenuItem::with_id(menu_ids::OPEN_CONFIG, "Open Config", true, None);
        menu.append(&open_config)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Reload Config
        let reload = MenuItem::with_id(menu_ids::RELOAD, "Reload Config", true, None);
        menu.append(&reload)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Separator
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Exit
        let exit = MenuItem::with_id(menu_ids::EXIT, "Exit", true, None);
        menu.append(&exit)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        // Create the tray icon with a simple embedded icon
        let icon = create_default_icon()?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("ShowDesk - per-monitor show desktop")
            .with_icon(icon)
            .build()
            .map_err(|e| TrayError::Build(e.to_string()))?;

        info!("System tray icon created");

        // Spawn thread to handle menu events and forward them
        std::thread::spawn(move || {
            let menu_channel = MenuEvent::receiver();
            while let Ok(event) = menu_channel.recv() {
                let tray_event = match event.id.0.as_str() {
                    menu_ids::TOGGLE => TrayEvent::Toggle,
                    menu_ids::OPEN_CONFIG => TrayEvent::OpenConfig,
                    menu_ids::RELOAD => TrayEvent::Reload,
                    menu_ids::EXIT => TrayEvent::Exit,
                    id => {
                        debug!("Unknown menu item clicked: {}", id);
                        continue;
                    }
                };

                if event_sender.send(tray_event).is_err() {
                    // Receiver dropped, exit thread
                    break;
                }
            }
        });

        Ok(Self { _tray: tray })
    }
}

/// Create a default icon for the tray: a monitor glyph with an empty
/// screen, which is the whole point of the program.
fn create_default_icon() -> Result<tray_icon::Icon, TrayError> {
    const SIZE: usize = 32;
    let mut rgba = vec![0u8; SIZE * SIZE * 4];

    // Bezel grey and screen blue
    let bezel = (70u8, 74u8, 80u8);
    let screen = (66u8, 133u8, 244u8);

    let set = |buffer: &mut Vec<u8>, x: usize, y: usize, color: (u8, u8, u8)| {
        let idx = (y * SIZE + x) * 4;
        buffer[idx] = color.0;
        buffer[idx + 1] = color.1;
        buffer[idx + 2] = color.2;
        buffer[idx + 3] = 255;
    };

    // Monitor body: bezel rectangle with the screen inset two pixels
    for y in 4..=22 {
        for x in 2..=29 {
            let color = if (6..=20).contains(&y) && (4..=27).contains(&x) {
                screen
            } else {
                bezel
            };
            set(&mut rgba, x, y, color);
        }
    }

    // Stand: neck then base
    for y in 23..=25 {
        for x in 13..=18 {
            set(&mut rgba, x, y, bezel);
        }
    }
    for y in 26..=27 {
        for x in 8..=23 {
            set(&mut rgba, x, y, bezel);
        }
    }

    tray_icon::Icon::from_rgba(rgba, SIZE as u32, SIZE as u32)
        .map_err(|e| TrayError::Icon(e.to_string()))
}

/// Errors that can occur during tray operations.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create menu: {0}")]
    Menu(String),

    #[error("Failed to build tray icon: {0}")]
    Build(String),

    #[error("Failed to create icon: {0}")]
    Icon(String),
}
