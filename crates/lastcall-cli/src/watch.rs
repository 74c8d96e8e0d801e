//! Interactive `watch` session: stdin commands in, rendered snapshots out.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use lastcall_core::{AppConfig, GeoPosition};
use lastcall_discovery::DiscoveryClient;
use lastcall_session::{Orchestrator, SessionDriver, SystemClock, UiCommand};
use tokio::sync::mpsc;

use crate::host::{FixedGeolocator, TerminalNotifier};
use crate::render::render_snapshot;

const COMMAND_CHANNEL_CAPACITY: usize = 16;
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Maps one line of user input to a session command.
pub(crate) fn parse_command(line: &str) -> Option<UiCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => Some(UiCommand::Refresh),
        "a" | "alerts" => Some(UiCommand::ToggleAlerts),
        "q" | "quit" | "exit" => Some(UiCommand::Quit),
        _ => None,
    }
}

/// Runs an interactive session until the user quits, stdin closes, or
/// ctrl-c is pressed.
///
/// # Errors
///
/// Returns an error if the coordinates are invalid or the discovery client
/// cannot be built.
pub(crate) async fn run_watch(
    config: &AppConfig,
    coordinates: Option<(f64, f64)>,
    alerts: bool,
    allow_notifications: bool,
) -> anyhow::Result<()> {
    let position = coordinates
        .map(|(lat, lng)| GeoPosition::new(lat, lng))
        .transpose()?;
    let client = Arc::new(DiscoveryClient::new(config)?);

    let orchestrator = Orchestrator::new(
        FixedGeolocator::new(position),
        TerminalNotifier::new(allow_notifications),
        config.alert_window_minutes,
    );
    let driver = SessionDriver::new(
        orchestrator,
        client,
        SystemClock,
        Duration::from_secs(config.alert_tick_secs),
    );

    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (snap_tx, mut snap_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);

    if alerts {
        cmd_tx.send(UiCommand::ToggleAlerts).await?;
    }

    let session = tokio::spawn(driver.run(cmd_rx, snap_tx));
    spawn_stdin_reader(cmd_tx.clone())?;
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c, ending session");
            let _ = cmd_tx.send(UiCommand::Quit).await;
        }
    });

    while let Some(snapshot) = snap_rx.recv().await {
        print!("{}", render_snapshot(&snapshot));
    }

    let final_state = session.await?;
    interrupt.abort();

    tracing::debug!(outlets = final_state.outlets.len(), "watch finished");
    Ok(())
}

/// Reads commands on a plain thread so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader(commands: mpsc::Sender<UiCommand>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("lastcall-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                match parse_command(&line) {
                    Some(command) => {
                        if commands.blocking_send(command).is_err() {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("unknown command {:?}; use r, a, or q", line.trim()),
                }
            }
            // End of input ends the session.
            let _ = commands.blocking_send(UiCommand::Quit);
        })?;
    Ok(())
}
