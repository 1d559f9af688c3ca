use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::session::{ConnectionState, SessionEvent, SessionHandle};

use super::console::PanelInput;
use super::router::Router;
use super::state::PanelState;

/// The single-threaded update loop behind the panel.
///
/// All panel state lives here and is only ever mutated between `select`
/// arms, so no synchronization is needed. Network work happens on the
/// session task; this loop just sends commands and folds the resulting
/// events into the model.
pub struct Panel {
    state: PanelState,
    router: Router,
    session: SessionHandle,
    events: mpsc::Receiver<SessionEvent>,
    input: mpsc::Receiver<PanelInput>,
}

impl Panel {
    pub fn new(
        router: Router,
        session: SessionHandle,
        events: mpsc::Receiver<SessionEvent>,
        input: mpsc::Receiver<PanelInput>,
    ) -> Self {
        Panel {
            state: PanelState::default(),
            router,
            session,
            events,
            input,
        }
    }

    pub async fn run(&mut self) {
        info!("Panel started, not connected");
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => apply_session_event(&mut self.state, &self.router, event),
                    None => break,
                },
                input = self.input.recv() => match input {
                    Some(input) => {
                        if !self.handle_input(input).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        self.session.disconnect().await;
        info!("Panel stopped");
    }

    /// Returns false when the loop should shut down.
    async fn handle_input(&mut self, input: PanelInput) -> bool {
        match input {
            PanelInput::Connect => match self.state.connection {
                ConnectionState::Connected => warn!("Already connected"),
                ConnectionState::Connecting => warn!("A connect is already in progress"),
                _ => self.session.connect().await,
            },
            PanelInput::Disconnect => self.session.disconnect().await,
            PanelInput::LedOn | PanelInput::LedOff => {
                let on = input == PanelInput::LedOn;
                if self.state.connection == ConnectionState::Connected {
                    self.session.set_led(on).await;
                } else {
                    warn!("Not connected, LED command ignored");
                }
            }
            PanelInput::Status => {
                info!("{}", self.state.render_status());
                for entry in self.state.log.entries() {
                    info!("  {entry}");
                }
            }
            PanelInput::Quit => return false,
        }
        true
    }
}

/// Folds one session event into the panel model.
pub fn apply_session_event(state: &mut PanelState, router: &Router, event: SessionEvent) {
    match event {
        SessionEvent::StateChanged(connection) => {
            info!("Connection state: {connection}");
            if connection == ConnectionState::Disconnected {
                state.sensor.reset();
            }
            state.connection = connection;
        }
        SessionEvent::Inbound(message) => {
            debug!("{}", message.render());
            router.route(state, &message);
        }
        SessionEvent::LedChanged(on) => {
            info!("LED is now {}", if on { "on" } else { "off" });
            state.led_on = on;
        }
        SessionEvent::PublishFailed(reason) => {
            warn!("LED command failed: {reason}");
            router.note_publish_failure(state, &reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::state::SensorReading;
    use crate::session::InboundMessage;

    fn router() -> Router {
        Router::new("valor-analogico")
    }

    #[test]
    fn disconnect_clears_the_sensor_reading() {
        let mut state = PanelState::default();
        apply_session_event(
            &mut state,
            &router(),
            SessionEvent::Inbound(InboundMessage::new("valor-analogico", "640")),
        );
        assert_eq!(state.sensor.value, "640");

        apply_session_event(
            &mut state,
            &router(),
            SessionEvent::StateChanged(ConnectionState::Disconnected),
        );
        assert_eq!(state.connection, ConnectionState::Disconnected);
        assert_eq!(state.sensor.value, SensorReading::NO_DATA);
    }

    #[test]
    fn led_state_follows_completed_publishes_only() {
        let mut state = PanelState::default();
        apply_session_event(&mut state, &router(), SessionEvent::PublishFailed("boom".into()));
        assert!(!state.led_on);
        assert_eq!(state.log.len(), 1);

        apply_session_event(&mut state, &router(), SessionEvent::LedChanged(true));
        assert!(state.led_on);
    }

    #[test]
    fn error_state_is_carried_into_the_model() {
        let mut state = PanelState::default();
        apply_session_event(
            &mut state,
            &router(),
            SessionEvent::StateChanged(ConnectionState::Error("bad credentials".into())),
        );
        assert_eq!(
            state.connection,
            ConnectionState::Error("bad credentials".into())
        );
    }

    #[test]
    fn inbound_messages_land_in_the_log() {
        let mut state = PanelState::default();
        apply_session_event(
            &mut state,
            &router(),
            SessionEvent::Inbound(InboundMessage::new("other-topic", "hello")),
        );
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.sensor.value, SensorReading::NO_DATA);
    }
}
