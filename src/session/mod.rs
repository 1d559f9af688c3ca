//! # Broker Session Module
//!
//! Owns the connection to the MQTT broker: TLS connect with
//! username/password authentication, the single sensor-topic subscription,
//! LED command publishes, and teardown. The rest of the application only
//! sees this module through a command/event channel pair.
//!
//! ```text
//! session/
//! ├── handle.rs   - actor handle, command and event types
//! ├── manager.rs  - client lifecycle and protocol event loop
//! └── message.rs  - decoded inbound publishes
//! ```
//!
//! There is no reconnection logic. When the connection dies the session
//! reports an error state and waits for the user to connect again.

pub mod handle;
pub mod manager;
pub mod message;

pub use handle::{SessionCommand, SessionEvent, SessionHandle};
pub use manager::{ConnectError, ConnectionState, PublishError, SessionManager};
pub use message::InboundMessage;
