use crate::session::InboundMessage;

use super::state::PanelState;

/// Routes inbound publishes into the panel model.
///
/// A message on the sensor topic overwrites the current reading; every
/// message, sensor or not, lands in the recent-message log.
pub struct Router {
    sensor_topic: String,
}

impl Router {
    pub fn new(sensor_topic: impl Into<String>) -> Self {
        Router {
            sensor_topic: sensor_topic.into(),
        }
    }

    pub fn route(&self, state: &mut PanelState, message: &InboundMessage) {
        if message.topic == self.sensor_topic {
            state
                .sensor
                .update(message.payload.clone(), message.received_at);
        }
        state.log.push(message.render());
    }

    /// Failed LED commands show up in the same log the messages use.
    pub fn note_publish_failure(&self, state: &mut PanelState, reason: &str) {
        state.log.push(format!("error sending LED command: {reason}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::state::SensorReading;

    fn router() -> Router {
        Router::new("valor-analogico")
    }

    #[test]
    fn sensor_message_overwrites_reading_with_exact_payload() {
        let mut state = PanelState::default();
        let message = InboundMessage::new("valor-analogico", "1023");
        router().route(&mut state, &message);
        assert_eq!(state.sensor.value, "1023");
        assert_eq!(state.sensor.received_at, Some(message.received_at));
    }

    #[test]
    fn other_topics_do_not_touch_the_reading() {
        let mut state = PanelState::default();
        let message = InboundMessage::new("control-led", "1");
        router().route(&mut state, &message);
        assert_eq!(state.sensor.value, SensorReading::NO_DATA);
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn every_message_is_logged() {
        let mut state = PanelState::default();
        router().route(&mut state, &InboundMessage::new("valor-analogico", "1"));
        router().route(&mut state, &InboundMessage::new("other", "2"));
        assert_eq!(state.log.len(), 2);
    }

    #[test]
    fn publish_failures_are_logged() {
        let mut state = PanelState::default();
        router().note_publish_failure(&mut state, "no active connection");
        let entries: Vec<&str> = state.log.entries().collect();
        assert_eq!(
            entries,
            vec!["error sending LED command: no active connection"]
        );
    }
}
