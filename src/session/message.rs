use chrono::{DateTime, Local};
use rumqttc::v5::mqttbytes::v5::Publish;
use std::fmt;

/// A single publish received from the broker, decoded to UTF-8.
///
/// Payloads on the panel's topics are short text values, so decoding is
/// lossy rather than fallible. The timestamp is taken at receive time on
/// this side, not from broker metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
    pub received_at: DateTime<Local>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        InboundMessage {
            topic: topic.into(),
            payload: payload.into(),
            received_at: Local::now(),
        }
    }

    pub fn from_publish(publish: &Publish) -> Self {
        InboundMessage::new(
            String::from_utf8_lossy(&publish.topic),
            String::from_utf8_lossy(&publish.payload),
        )
    }

    /// Log-line form used by the recent-message view.
    pub fn render(&self) -> String {
        format!(
            "{}: {} = {}",
            self.received_at.format("%H:%M:%S.%3f"),
            self.topic,
            self.payload
        )
    }
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} on {}", self.payload, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_contains_topic_and_payload() {
        let msg = InboundMessage::new("valor-analogico", "512");
        let rendered = msg.render();
        assert!(rendered.contains("valor-analogico = 512"));
        assert!(rendered.contains(':'));
    }

    #[test]
    fn payload_is_kept_verbatim() {
        let msg = InboundMessage::new("valor-analogico", "  007 ");
        assert_eq!(msg.payload, "  007 ");
    }
}
