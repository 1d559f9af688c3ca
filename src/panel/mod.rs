//! # Panel Module
//!
//! The model-update-view side of the application. `PanelState` is the
//! explicit model, the `Panel` loop is the single place it gets updated,
//! and rendering is done through the log output. Input arrives from the
//! console reader, results arrive as session events; both over bounded
//! channels.
//!
//! ```text
//! panel/
//! ├── app.rs      - update loop
//! ├── console.rs  - stdin front-end
//! ├── router.rs   - inbound message routing
//! └── state.rs    - model types
//! ```

pub mod app;
pub mod console;
pub mod router;
pub mod state;

pub use app::Panel;
pub use console::PanelInput;
pub use router::Router;
pub use state::{PanelState, RecentMessageLog, SensorReading, RECENT_LOG_CAPACITY};
