//! CLI adapter — stdin/stdout chat surface.
//!
//! Physical access to the terminal implies owner trust, so command events
//! are synthesized with the first configured allow-listed sender as the
//! invoking identifier.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::bridge::dispatch::ChatOutbound;
use crate::bridge::outbound::OutboundGate;
use crate::chat::{commands, ChatCommandEvent};
use crate::config::NtfyConfig;

/// Synthesize an owner command event for terminal input.
///
/// The sender identifier is the first non-empty segment of the configured
/// `sender` list, so terminal input passes the same allow-list check as
/// any chat sender.
pub fn owner_event(config: &NtfyConfig, message: &str) -> ChatCommandEvent {
    let owner = config
        .sender
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("unknown");
    ChatCommandEvent::new(owner, "cli", message)
}

/// Dispatch one input line to the matching command handler and return the
/// replies. Unknown commands get a usage hint; blank lines are ignored.
pub async fn handle_line(gate: &OutboundGate, ntfy: &NtfyConfig, line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // "/ntfy hello" carries "ntfy hello" as the event body; the gate is
    // responsible for stripping the trigger word.
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let (command, _) = body.split_once(char::is_whitespace).unwrap_or((body, ""));

    match command {
        "ntfy_test" => {
            let event = owner_event(ntfy, body);
            commands::handle_test(gate, ntfy, &event).await
        }
        "ntfy" => {
            let event = owner_event(ntfy, body);
            commands::handle_publish(gate, &event).await
        }
        other => vec![format!("unknown command: {other} (try /ntfy or /ntfy_test)")],
    }
}

/// Drive the terminal surface until stdin closes or Ctrl-C arrives.
///
/// Interleaves three inputs on one cooperative loop: command lines from
/// stdin, dispatched notifications from the poll engine, and the shutdown
/// signal.
///
/// # Errors
///
/// Returns an error if reading stdin fails.
pub async fn run(
    gate: &OutboundGate,
    ntfy: &NtfyConfig,
    mut outbound_rx: mpsc::Receiver<ChatOutbound>,
) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        for reply in handle_line(gate, ntfy, &line).await {
                            println!("{reply}");
                        }
                    }
                    None => {
                        info!("stdin closed, shutting down");
                        break;
                    }
                }
            }
            notification = outbound_rx.recv() => {
                if let Some(msg) = notification {
                    println!("{}", msg.text);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}
