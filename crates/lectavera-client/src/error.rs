use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The auth store held no access token when a connection was attempted.
    /// This is a precondition failure: no connection attempt is made and no
    /// reconnect is scheduled.
    #[error("no access token available")]
    MissingCredential,

    #[error("channel is not connected")]
    NotConnected,

    /// The session client (or its channel actor) has already shut down.
    #[error("session client is shut down")]
    ChannelClosed,

    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
