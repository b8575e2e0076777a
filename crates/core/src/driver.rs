//! Bridge to the browser-automation driver process.
//!
//! The driver owns the actual WhatsApp client (browser and all); this side
//! only speaks its line protocol: one JSON command per line on stdin, one
//! JSON event per line on stdout. Unparseable lines are logged and skipped
//! so a chatty driver cannot take the bridge down. EOF on stdout means the
//! client is gone and is surfaced to the relay as a final disconnect.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use warelay_protocol::{DriverCommand, DriverEvent};

use crate::error::{Error, Result};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// A spawned driver process with its command channel.
///
/// Dropping the handle kills the process.
pub struct Driver {
    _child: Child,
    commands: mpsc::Sender<DriverCommand>,
}

impl Driver {
    /// Spawns the driver and wires up its stdio.
    ///
    /// Returns the handle and the stream of lifecycle events to feed the
    /// relay.
    pub fn spawn(command: &str, args: &[String]) -> Result<(Self, mpsc::Receiver<DriverEvent>)> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Driver(format!("failed to spawn driver `{command}`: {e}")))?;

        info!(target = "wa.driver", %command, "driver spawned");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Driver("driver stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Driver("driver stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Driver("driver stderr unavailable".into()))?;

        let (command_tx, mut command_rx) = mpsc::channel::<DriverCommand>(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<DriverEvent>(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut stdin = stdin;
            while let Some(command) = command_rx.recv().await {
                let line = match serde_json::to_string(&command) {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(target = "wa.driver", error = %err, "failed to encode command");
                        continue;
                    }
                };
                if stdin.write_all(line.as_bytes()).await.is_err()
                    || stdin.write_all(b"\n").await.is_err()
                    || stdin.flush().await.is_err()
                {
                    warn!(target = "wa.driver", "driver stdin closed");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<DriverEvent>(line) {
                            Ok(event) => {
                                if event_tx.send(event).await.is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                warn!(target = "wa.driver", error = %err, "unparseable driver line");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(target = "wa.driver", error = %err, "driver stdout read failed");
                        break;
                    }
                }
            }
            // The event stream must end in a disconnect so the relay's last
            // word is never a stale ready state.
            let _ = event_tx
                .send(DriverEvent::Disconnected {
                    reason: Some("driver stream closed".into()),
                })
                .await;
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target = "wa.driver", "{line}");
            }
        });

        Ok((
            Self {
                _child: child,
                commands: command_tx,
            },
            event_rx,
        ))
    }

    /// Channel for sending commands into the driver.
    pub fn commands(&self) -> mpsc::Sender<DriverCommand> {
        self.commands.clone()
    }

    /// Sends the construction-time init command.
    pub async fn init(
        &self,
        session: Option<serde_json::Value>,
        browser_path: Option<String>,
    ) -> Result<()> {
        self.commands
            .send(DriverCommand::Init {
                session,
                browser_path,
            })
            .await
            .map_err(|_| Error::Driver("driver command channel closed".into()))
    }
}
