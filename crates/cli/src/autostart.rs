//! Start-at-logon management via the HKCU Run registry key.
//!
//! Writes a `ShowDesk` value under
//! `HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Run` so the
//! daemon is started on user logon. HKCU is per-user, so no elevation is
//! required.

use anyhow::{Context, Result};
use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_WRITE};
use winreg::RegKey;

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
const VALUE_NAME: &str = "ShowDesk";

/// Registers the daemon to start on Windows logon.
pub fn enable() -> Result<()> {
    let command = daemon_command()?;
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu
        .create_subkey(RUN_KEY)
        .context("could not open the Run registry key")?;
    key.set_value(VALUE_NAME, &command)
        .context("could not write the autostart registry value")?;
    Ok(())
}

/// Removes the autostart entry. Succeeds when the entry does not exist.
pub fn disable() -> Result<()> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey_with_flags(RUN_KEY, KEY_WRITE)
        .context("could not open the Run registry key")?;
    match key.delete_value(VALUE_NAME) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("could not delete the autostart registry value"),
    }
}

/// Whether the autostart entry currently exists.
pub fn is_enabled() -> bool {
    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(RUN_KEY, KEY_READ)
        .and_then(|key| key.get_value::<String, _>(VALUE_NAME))
        .is_ok()
}

/// The registry value: the daemon binary, quoted. The daemon sits next to
/// this CLI binary in the installation directory.
fn daemon_command() -> Result<String> {
    let cli = std::env::current_exe().context("could not resolve the CLI executable path")?;
    let daemon = cli.with_file_name("showdesk.exe");
    Ok(format!("\"{}\"", daemon.display()))
}
