use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

const CONFIG_DIR: &str = "mqttpanel";
const CONFIG_FILE: &str = "config.toml";

/// Complete panel configuration, loaded from one TOML file.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct PanelConfig {
    pub broker: BrokerConfig,
    pub topics: TopicConfig,
}

/// Broker endpoint and credentials.
///
/// Credentials live in the config file as plain values. Anything smarter
/// (keyrings, env indirection) is a deployment concern handled outside
/// this application.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            host: "e9b7179ea7f54e56a657a9e7b4a416f1.s1.eu.hivemq.cloud".to_string(),
            port: 8883,
            username: "admin".to_string(),
            password: "Password5".to_string(),
            client_id: "mqttpanel".to_string(),
            keep_alive_secs: 5,
        }
    }
}

/// The two fixed topics the panel works with.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TopicConfig {
    /// Analog sensor readings published by the firmware.
    pub sensor: String,
    /// LED on/off commands consumed by the firmware.
    pub led: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        TopicConfig {
            sensor: "valor-analogico".to_string(),
            led: "control-led".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| eyre!("No config directory available"))?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

/// Loads the panel configuration, writing a default file on first start.
pub async fn load_or_create() -> Result<PanelConfig> {
    let path = config_path()?;

    if !fs::try_exists(&path)
        .await
        .map_err(|e| eyre!("Failed to check for config file: {}", e))?
    {
        let config = PanelConfig::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(&config)
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        fs::write(&path, content)
            .await
            .map_err(|e| eyre!("Failed to write default config file: {}", e))?;
        info!("Wrote default configuration to {}", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| eyre!("Failed to read config file: {}", e))?;
    let config = toml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployed_firmware() {
        let config = PanelConfig::default();
        assert_eq!(config.broker.port, 8883);
        assert_eq!(config.topics.sensor, "valor-analogico");
        assert_eq!(config.topics.led, "control-led");
    }

    #[test]
    fn config_file_parses() {
        let content = r#"
            [broker]
            host = "broker.example.net"
            port = 8883
            username = "panel"
            password = "secret"
            client_id = "panel-1"
            keep_alive_secs = 10

            [topics]
            sensor = "sensors/ldr"
            led = "actuators/led"
        "#;
        let config: PanelConfig = toml::from_str(content).expect("parse");
        assert_eq!(config.broker.host, "broker.example.net");
        assert_eq!(config.topics.led, "actuators/led");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = PanelConfig::default();
        let content = toml::to_string_pretty(&config).expect("serialize");
        let parsed: PanelConfig = toml::from_str(&content).expect("parse");
        assert_eq!(parsed, config);
    }
}
