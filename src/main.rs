pub mod config;
pub mod panel;
pub mod session;

use crate::panel::{console, Panel, Router};
use crate::session::SessionHandle;
use color_eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = config::load_or_create().await?;
    info!(
        "Panel configured for {}:{}",
        config.broker.host, config.broker.port
    );

    let router = Router::new(config.topics.sensor.clone());
    let (session, session_events) = SessionHandle::spawn(config);
    let input = console::spawn_reader();

    let mut panel = Panel::new(router, session, session_events, input);
    panel.run().await;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
