use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::session::ConnectionState;

/// How many recent messages the panel keeps around.
pub const RECENT_LOG_CAPACITY: usize = 10;

/// Latest value seen on the sensor topic.
///
/// Overwritten by every inbound sensor message and reset to the
/// placeholder when the session disconnects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorReading {
    pub value: String,
    pub received_at: Option<DateTime<Local>>,
}

impl SensorReading {
    pub const NO_DATA: &'static str = "no data";

    pub fn update(&mut self, value: String, received_at: DateTime<Local>) {
        self.value = value;
        self.received_at = Some(received_at);
    }

    pub fn reset(&mut self) {
        self.value = Self::NO_DATA.to_string();
        self.received_at = None;
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        SensorReading {
            value: Self::NO_DATA.to_string(),
            received_at: None,
        }
    }
}

/// Bounded FIFO of rendered message lines, oldest evicted first.
#[derive(Clone, Debug, Default)]
pub struct RecentMessageLog {
    entries: VecDeque<String>,
}

impl RecentMessageLog {
    pub fn push(&mut self, entry: String) {
        if self.entries.len() == RECENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The whole panel model. Owned and mutated only by the panel loop.
#[derive(Clone, Debug, Default)]
pub struct PanelState {
    pub connection: ConnectionState,
    pub sensor: SensorReading,
    pub led_on: bool,
    pub log: RecentMessageLog,
}

impl PanelState {
    /// One-line summary for the status command.
    pub fn render_status(&self) -> String {
        format!(
            "connection: {} | sensor: {} | led: {}",
            self.connection,
            self.sensor.value,
            if self.led_on { "on" } else { "off" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_never_exceeds_capacity() {
        let mut log = RecentMessageLog::default();
        for i in 0..25 {
            log.push(format!("entry {i}"));
        }
        assert_eq!(log.len(), RECENT_LOG_CAPACITY);
    }

    #[test]
    fn log_evicts_oldest_first() {
        let mut log = RecentMessageLog::default();
        for i in 0..12 {
            log.push(format!("entry {i}"));
        }
        let entries: Vec<&str> = log.entries().collect();
        assert_eq!(entries.first(), Some(&"entry 2"));
        assert_eq!(entries.last(), Some(&"entry 11"));
    }

    #[test]
    fn log_preserves_insertion_order() {
        let mut log = RecentMessageLog::default();
        log.push("a".into());
        log.push("b".into());
        log.push("c".into());
        let entries: Vec<&str> = log.entries().collect();
        assert_eq!(entries, vec!["a", "b", "c"]);
    }

    #[test]
    fn sensor_reading_resets_to_placeholder() {
        let mut reading = SensorReading::default();
        reading.update("812".into(), Local::now());
        assert_eq!(reading.value, "812");
        reading.reset();
        assert_eq!(reading.value, SensorReading::NO_DATA);
        assert!(reading.received_at.is_none());
    }

    #[test]
    fn status_line_reflects_led_state() {
        let mut state = PanelState::default();
        assert!(state.render_status().contains("led: off"));
        state.led_on = true;
        assert!(state.render_status().contains("led: on"));
    }
}
