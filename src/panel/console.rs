use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Actions the console front-end can request from the panel loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelInput {
    Connect,
    Disconnect,
    LedOn,
    LedOff,
    Status,
    Quit,
}

pub fn parse_line(line: &str) -> Option<PanelInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "connect" => Some(PanelInput::Connect),
        "disconnect" => Some(PanelInput::Disconnect),
        "on" => Some(PanelInput::LedOn),
        "off" => Some(PanelInput::LedOff),
        "status" => Some(PanelInput::Status),
        "quit" | "exit" => Some(PanelInput::Quit),
        _ => None,
    }
}

/// Spawns the stdin reader task and returns its output channel.
///
/// The task ends on EOF or after forwarding a quit, sending a final
/// `Quit` so the panel loop shuts down cleanly either way.
pub fn spawn_reader() -> mpsc::Receiver<PanelInput> {
    let (input_tx, input_rx) = mpsc::channel(100);

    tokio::spawn(async move {
        info!("Commands: connect, disconnect, on, off, status, quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    Some(input) => {
                        let quit = input == PanelInput::Quit;
                        if input_tx.send(input).await.is_err() || quit {
                            break;
                        }
                    }
                    None => {
                        if !line.trim().is_empty() {
                            warn!("Unknown command: {}", line.trim());
                        }
                    }
                },
                Ok(None) => {
                    let _ = input_tx.send(PanelInput::Quit).await;
                    break;
                }
                Err(err) => {
                    warn!("Failed to read console input: {err}");
                    let _ = input_tx.send(PanelInput::Quit).await;
                    break;
                }
            }
        }
    });

    input_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_commands_parse() {
        assert_eq!(parse_line("connect"), Some(PanelInput::Connect));
        assert_eq!(parse_line("  ON "), Some(PanelInput::LedOn));
        assert_eq!(parse_line("off"), Some(PanelInput::LedOff));
        assert_eq!(parse_line("Disconnect"), Some(PanelInput::Disconnect));
        assert_eq!(parse_line("status"), Some(PanelInput::Status));
        assert_eq!(parse_line("exit"), Some(PanelInput::Quit));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert_eq!(parse_line("toggle"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("on off"), None);
    }
}
