//! Session Handle - command/event interface to the broker session
//!
//! The panel never touches the MQTT client directly. It sends
//! [`SessionCommand`]s through this handle and receives [`SessionEvent`]s
//! on a bounded channel, so every network call runs on the session task
//! and the panel loop stays free of blocking I/O.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::PanelConfig;

use super::manager::{ConnectionState, SessionManager};
use super::message::InboundMessage;

const CHANNEL_CAPACITY: usize = 100;

/// Requests the panel can issue against the session.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    Connect,
    SetLed(bool),
    Disconnect,
}

/// Everything the session reports back to the panel.
///
/// `LedChanged` is only emitted after the publish call completed, a failed
/// command surfaces as `PublishFailed` instead of flipping the LED state.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    Inbound(InboundMessage),
    LedChanged(bool),
    PublishFailed(String),
}

/// Cloneable sender half of the session actor.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Spawns the session task and returns the handle together with the
    /// event receiver for the panel loop.
    ///
    /// Commands are processed strictly in order, one at a time. An
    /// in-flight connect occupies the task until the broker answers, so
    /// it cannot be aborted; the panel guards against issuing overlapping
    /// operations while one is pending.
    pub fn spawn(config: PanelConfig) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (command_tx, mut command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut manager = SessionManager::new(config, event_tx.clone());
        tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                match command {
                    SessionCommand::Connect => {
                        if let Err(err) = manager.connect().await {
                            warn!("Connect failed: {err}");
                        }
                    }
                    SessionCommand::SetLed(on) => match manager.publish_led(on).await {
                        Ok(()) => {
                            let _ = event_tx.send(SessionEvent::LedChanged(on)).await;
                        }
                        Err(err) => {
                            let _ = event_tx
                                .send(SessionEvent::PublishFailed(err.to_string()))
                                .await;
                        }
                    },
                    SessionCommand::Disconnect => manager.disconnect().await,
                }
            }
            // All handles dropped: close the broker connection on the way out.
            manager.disconnect().await;
            info!("Session task stopped");
        });

        (
            SessionHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    pub async fn connect(&self) {
        self.send(SessionCommand::Connect).await;
    }

    pub async fn set_led(&self, on: bool) {
        self.send(SessionCommand::SetLed(on)).await;
    }

    pub async fn disconnect(&self) {
        self.send(SessionCommand::Disconnect).await;
    }

    async fn send(&self, command: SessionCommand) {
        if self.commands.send(command).await.is_err() {
            warn!("Session task is gone, command dropped");
        }
    }
}
