//! ShowDesk CLI
//!
//! Command-line interface for controlling the ShowDesk daemon.
//!
//! Commands are sent to the daemon via IPC (named pipe); `autostart` writes
//! the registry directly and works without a running daemon.

mod autostart;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use showdesk_ipc::{IpcCommand, IpcResponse, ToggleAction, WindowStyle, PIPE_NAME};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::windows::named_pipe::ClientOptions;

#[derive(Parser)]
#[command(name = "showdesk-cli")]
#[command(author, version, about = "Control the ShowDesk daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Toggle the desktop on a monitor
    Toggle {
        /// Monitor index (defaults to the monitor under the cursor)
        #[arg(short, long)]
        monitor: Option<usize>,
    },
    /// Show daemon status
    Status,
    /// List monitors and their toggle state
    Monitors,
    /// List the application windows the daemon sees
    Windows,
    /// Reload configuration
    Reload,
    /// Stop the daemon
    Stop,
    /// Manage start-at-logon
    Autostart {
        #[command(subcommand)]
        action: AutostartAction,
    },
}

#[derive(Subcommand)]
enum AutostartAction {
    /// Start the daemon on logon
    Enable,
    /// Do not start the daemon on logon
    Disable,
    /// Show whether autostart is configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cmd = match cli.command {
        Commands::Toggle { monitor } => IpcCommand::Toggle { monitor },
        Commands::Status => IpcCommand::QueryStatus,
        Commands::Monitors => IpcCommand::QueryMonitors,
        Commands::Windows => IpcCommand::QueryWindows,
        Commands::Reload => IpcCommand::Reload,
        Commands::Stop => IpcCommand::Stop,
        Commands::Autostart { action } => {
            match action {
                AutostartAction::Enable => {
                    autostart::enable()?;
                    println!("Autostart enabled");
                }
                AutostartAction::Disable => {
                    autostart::disable()?;
                    println!("Autostart disabled");
                }
                AutostartAction::Status => {
                    if autostart::is_enabled() {
                        println!("Autostart is enabled");
                    } else {
                        println!("Autostart is disabled");
                    }
                }
            }
            return Ok(());
        }
    };

    let response = send_command(&cmd).await?;
    match response {
        IpcResponse::Error { message } => anyhow::bail!(message),
        other => print!("{}", format_response(&other)),
    }

    Ok(())
}

/// Send one command over the named pipe and read the single-line response.
async fn send_command(cmd: &IpcCommand) -> Result<IpcResponse> {
    let pipe = ClientOptions::new()
        .open(PIPE_NAME)
        .context("Could not connect to the daemon - is showdesk running?")?;
    let (reader, mut writer) = tokio::io::split(pipe);

    let json = serde_json::to_string(cmd)? + "\n";
    writer.write_all(json.as_bytes()).await?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("Daemon closed the connection without responding")?;

    serde_json::from_str(line.trim()).context("Invalid response from daemon")
}

/// Render a response for the terminal.
fn format_response(response: &IpcResponse) -> String {
    match response {
        IpcResponse::Ok => "OK\n".to_string(),
        IpcResponse::Error { message } => format!("Error: {}\n", message),
        IpcResponse::ToggleResult {
            monitor,
            action,
            windows,
        } => {
            let verb = match action {
                ToggleAction::Minimized => "Minimized",
                ToggleAction::Restored => "Restored",
            };
            format!("{} {} window(s) on monitor {}\n", verb, windows, monitor)
        }
        IpcResponse::StatusInfo {
            version,
            monitors,
            pending_restores,
            uptime_seconds,
        } => {
            format!(
                "showdesk {}\n  monitors:         {}\n  pending restores: {}\n  uptime:           {}s\n",
                version, monitors, pending_restores, uptime_seconds
            )
        }
        IpcResponse::MonitorList { monitors } => {
            let mut out = String::new();
            for m in monitors {
                out.push_str(&format!(
                    "{} {} {}x{} at {},{}{}{}\n",
                    m.index,
                    m.device_name,
                    m.rect.width,
                    m.rect.height,
                    m.rect.x,
                    m.rect.y,
                    if m.is_primary { " [primary]" } else { "" },
                    if m.pending_restore {
                        " [pending restore]"
                    } else {
                        ""
                    },
                ));
            }
            out
        }
        IpcResponse::WindowList { windows } => {
            let mut out = String::new();
            for w in windows {
                let style = match w.style {
                    WindowStyle::Disabled => "disabled",
                    WindowStyle::Minimized => "minimized",
                    WindowStyle::Visible => "visible",
                };
                let z = w
                    .z_index
                    .map(|z| z.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let monitor = w
                    .monitor
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:#010x} monitor={} z={} {:9} \"{}\"\n",
                    w.handle, monitor, z, style, w.title
                ));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdesk_ipc::{IpcRect, MonitorEntry, WindowEntry};

    #[test]
    fn test_format_ok() {
        assert_eq!(format_response(&IpcResponse::Ok), "OK\n");
    }

    #[test]
    fn test_format_toggle_result() {
        let out = format_response(&IpcResponse::ToggleResult {
            monitor: 1,
            action: ToggleAction::Minimized,
            windows: 3,
        });
        assert_eq!(out, "Minimized 3 window(s) on monitor 1\n");

        let out = format_response(&IpcResponse::ToggleResult {
            monitor: 0,
            action: ToggleAction::Restored,
            windows: 0,
        });
        assert_eq!(out, "Restored 0 window(s) on monitor 0\n");
    }

    #[test]
    fn test_format_status() {
        let out = format_response(&IpcResponse::StatusInfo {
            version: "0.1.0".to_string(),
            monitors: 2,
            pending_restores: 1,
            uptime_seconds: 42,
        });
        assert!(out.starts_with("showdesk 0.1.0\n"));
        assert!(out.contains("monitors:         2"));
        assert!(out.contains("pending restores: 1"));
        assert!(out.contains("42s"));
    }

    #[test]
    fn test_format_monitor_list() {
        let out = format_response(&IpcResponse::MonitorList {
            monitors: vec![MonitorEntry {
                index: 0,
                device_name: r"\\.\DISPLAY1".to_string(),
                rect: IpcRect::new(0, 0, 1920, 1080),
                work_area: IpcRect::new(0, 0, 1920, 1040),
                is_primary: true,
                pending_restore: true,
            }],
        });
        assert!(out.contains(r"\\.\DISPLAY1"));
        assert!(out.contains("1920x1080"));
        assert!(out.contains("[primary]"));
        assert!(out.contains("[pending restore]"));
    }

    #[test]
    fn test_format_window_list() {
        let out = format_response(&IpcResponse::WindowList {
            windows: vec![WindowEntry {
                handle: 0x100,
                title: "Editor".to_string(),
                monitor: Some(0),
                z_index: None,
                style: WindowStyle::Visible,
                rect: IpcRect::new(0, 0, 800, 600),
            }],
        });
        assert!(out.contains("0x00000100"));
        assert!(out.contains("monitor=0"));
        assert!(out.contains("z=-"));
        assert!(out.contains("\"Editor\""));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
