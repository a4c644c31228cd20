//! The transport layer: one persistent WebSocket per study session, driven
//! by an actor that owns the connection, the reconnect schedule, and the
//! ordered outbound event queue.

pub mod channel;
pub mod protocol;
pub mod reconnect;

pub use channel::{
    ChannelEvent, ChannelHandle, Connector, WireConnection, WsConnector, spawn_channel,
};
