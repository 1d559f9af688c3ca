use std::time::Duration;

use rumqttc::v5::mqttbytes::v5::{ConnectReturnCode, Packet};
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, ClientError, ConnectionError, Event, EventLoop, MqttOptions};
use rumqttc::Transport;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PanelConfig;

use super::handle::SessionEvent;
use super::message::InboundMessage;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("a connection already exists or is being established")]
    AlreadyConnected,

    #[error("broker rejected the connection: {0:?}")]
    Rejected(ConnectReturnCode),

    #[error("transport failure: {0}")]
    Transport(#[from] ConnectionError),

    #[error("subscribing to the sensor topic failed: {0}")]
    Subscribe(#[source] ClientError),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("no active connection")]
    NotConnected,

    #[error("publish failed: {0}")]
    Transport(#[from] ClientError),
}

/// Payload the firmware expects on the LED control topic.
pub fn led_payload(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

/// Owns the single MQTT client handle and its protocol event loop.
///
/// All methods are driven from the session task, one command at a time.
/// Inbound publishes and state changes are pushed into the session event
/// channel; the manager itself never touches panel state.
pub struct SessionManager {
    config: PanelConfig,
    client: Option<AsyncClient>,
    forwarder: Option<CancellationToken>,
    state: ConnectionState,
    events: mpsc::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(config: PanelConfig, events: mpsc::Sender<SessionEvent>) -> Self {
        SessionManager {
            config,
            client: None,
            forwarder: None,
            state: ConnectionState::Disconnected,
            events,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Opens the TLS connection, authenticates, and subscribes to the
    /// sensor topic.
    ///
    /// The protocol event loop is polled inline until the broker answers
    /// with CONNACK, so authentication rejections and TLS failures surface
    /// here instead of dying silently in a background task. Only after a
    /// successful handshake is the event loop handed off to the forwarder.
    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        if self.client.is_some() || self.state == ConnectionState::Connecting {
            return Err(ConnectError::AlreadyConnected);
        }
        self.set_state(ConnectionState::Connecting).await;

        let broker = &self.config.broker;
        info!("Connecting to {}:{}", broker.host, broker.port);

        let mut options = MqttOptions::new(
            broker.client_id.clone(),
            broker.host.clone(),
            broker.port,
        );
        options.set_transport(Transport::tls_with_default_config());
        options.set_credentials(broker.username.clone(), broker.password.clone());
        options.set_keep_alive(Duration::from_secs(broker.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 100);

        if let Err(err) = await_connack(&mut eventloop).await {
            warn!("Connection attempt failed: {err}");
            self.set_state(ConnectionState::Error(err.to_string())).await;
            return Err(err);
        }

        let sensor_topic = self.config.topics.sensor.clone();
        if let Err(err) = client.subscribe(sensor_topic.clone(), QoS::AtLeastOnce).await {
            let err = ConnectError::Subscribe(err);
            self.set_state(ConnectionState::Error(err.to_string())).await;
            return Err(err);
        }
        info!("Subscribed to {sensor_topic}");

        let cancel = CancellationToken::new();
        tokio::spawn(forward_publishes(
            eventloop,
            self.events.clone(),
            cancel.clone(),
        ));

        self.client = Some(client);
        self.forwarder = Some(cancel);
        self.set_state(ConnectionState::Connected).await;
        Ok(())
    }

    /// Fire-and-forget publish of an LED command to the control topic.
    ///
    /// Fails locally with [`PublishError::NotConnected`] when no client
    /// handle exists; no network call is made in that case.
    pub async fn publish_led(&self, on: bool) -> Result<(), PublishError> {
        let client = self.client.as_ref().ok_or(PublishError::NotConnected)?;
        let topic = self.config.topics.led.clone();
        client
            .publish(topic.clone(), QoS::AtMostOnce, false, led_payload(on))
            .await?;
        debug!("Published {} to {topic}", led_payload(on));
        Ok(())
    }

    /// Best-effort close. The client handle and forwarder are always
    /// cleared, a failing DISCONNECT is logged and swallowed.
    pub async fn disconnect(&mut self) {
        if let Some(cancel) = self.forwarder.take() {
            cancel.cancel();
        }
        if let Some(client) = self.client.take() {
            if let Err(err) = client.disconnect().await {
                warn!("Error while closing the broker connection: {err}");
            }
        }
        self.set_state(ConnectionState::Disconnected).await;
    }

    async fn set_state(&mut self, state: ConnectionState) {
        self.state = state.clone();
        if self
            .events
            .send(SessionEvent::StateChanged(state))
            .await
            .is_err()
        {
            debug!("Session event channel closed, dropping state change");
        }
    }
}

/// Drives the handshake until the broker's CONNACK arrives.
async fn await_connack(eventloop: &mut EventLoop) -> Result<(), ConnectError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    return Ok(());
                }
                return Err(ConnectError::Rejected(ack.code));
            }
            Ok(_) => continue,
            Err(err) => return Err(ConnectError::Transport(err)),
        }
    }
}

/// Relays inbound publishes from the protocol event loop into the session
/// event channel, in arrival order.
///
/// Runs until cancelled by [`SessionManager::disconnect`] or until the
/// connection dies. A poll error after cancellation is expected (the
/// DISCONNECT racing the poll) and is not reported as a state change.
async fn forward_publishes(
    mut eventloop: EventLoop,
    events: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Event loop forwarder stopped");
                break;
            }
            polled = eventloop.poll() => match polled {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let message = InboundMessage::from_publish(&publish);
                    debug!("Inbound publish: {message}");
                    if events.send(SessionEvent::Inbound(message)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    warn!("Connection lost: {err}");
                    let _ = events
                        .send(SessionEvent::StateChanged(ConnectionState::Error(
                            err.to_string(),
                        )))
                        .await;
                    break;
                }
            }
        }
    }
}
