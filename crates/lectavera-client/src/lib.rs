//! Streaming study-session client for the Lectavera app.
//!
//! The client owns one persistent WebSocket per study session and turns the
//! backend's streamed output into an ordered transcript:
//!
//! - [`transport`]: the channel actor (one connection per epoch), the wire
//!   frames, and the capped-backoff reconnect policy.
//! - [`transcript`]: the message accumulator, an append-only transcript with
//!   a single mutable streaming tail.
//! - [`session`]: the facade the UI talks to. Send a turn, observe the
//!   connection flag, subscribe to transcript updates.
//!
//! Credentials come from an explicitly shared [`lectavera_auth::AuthStore`];
//! the channel reads the access token once per connection attempt and never
//! logs it.

pub mod config;
pub mod error;
pub mod session;
pub mod transcript;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{SessionEvent, StudySessionClient};
pub use transcript::Transcript;
pub use transport::protocol::{ClientFrame, ServerFrame};
pub use transport::reconnect::ReconnectPolicy;
pub use transport::{ChannelEvent, Connector, WireConnection, WsConnector};
