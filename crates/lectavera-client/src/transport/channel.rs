//! The transport channel actor.
//!
//! One actor task per session client. The actor owns at most one underlying
//! WebSocket connection at a time, reconnecting with capped backoff after an
//! unexpected close. Everything the rest of the client sees comes out of a
//! single ordered event queue, so transcript mutations never race.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use lectavera_auth::AuthStore;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{ClientError, Result};
use crate::transport::protocol::{ClientFrame, ServerFrame};
use crate::transport::reconnect::ReconnectPolicy;

const LOG_TARGET: &str = "lectavera_client::transport";

const CMD_QUEUE_CAPACITY: usize = 32;
const EVENT_QUEUE_CAPACITY: usize = 64;

pub type WireSink = Pin<Box<dyn Sink<String, Error = ClientError> + Send>>;
pub type WireStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A live connection: a sink of outbound text frames and a stream of inbound
/// ones. The stream ending means the connection closed (graceful or not; the
/// channel cannot tell the difference, matching the underlying close event).
pub struct WireConnection {
    pub sink: WireSink,
    pub stream: WireStream,
}

/// Seam between the channel actor and the actual WebSocket dial. Production
/// uses [`WsConnector`]; tests substitute a scripted implementation.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, session_id: &str, token: &str) -> Result<WireConnection>;
}

/// Dials `{base}/ws/{session_id}?token={token}` with tokio-tungstenite.
pub struct WsConnector {
    base_url: String,
}

impl WsConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, session_id: &str, token: &str) -> Result<WireConnection> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/ws/{session_id}"))?;
        url.query_pairs_mut().append_pair("token", token);

        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::Handshake(e.to_string()))?;
        let (sink, stream) = ws.split();

        let sink = Box::pin(
            sink.sink_map_err(|e| ClientError::Transport(e.to_string()))
                .with(|text: String| {
                    futures_util::future::ready(Ok::<_, ClientError>(WsMessage::Text(text)))
                }),
        );
        let stream = Box::pin(stream.filter_map(|item| {
            futures_util::future::ready(match item {
                Ok(WsMessage::Text(text)) => Some(Ok(text)),
                // Pings are answered by the library; binary frames are not
                // part of the protocol; Close is followed by stream end.
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::Transport(e.to_string()))),
            })
        }));

        Ok(WireConnection { sink, stream })
    }
}

#[derive(Debug)]
pub enum ChannelCommand {
    Send(ClientFrame),
    Disconnect,
}

/// Events the channel emits, strictly in occurrence order, on one queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    /// Any close, graceful or abnormal. Also emitted once per failed
    /// connection attempt, mirroring the close event a browser socket fires
    /// after a failed open.
    Disconnected,
    /// One successfully parsed inbound frame.
    Frame(ServerFrame),
    /// A transport-level error. Does not itself imply closure.
    TransportError(String),
}

/// Clonable handle to the channel actor.
#[derive(Clone)]
pub struct ChannelHandle {
    cmd_tx: mpsc::Sender<ChannelCommand>,
    connected_rx: watch::Receiver<bool>,
}

impl ChannelHandle {
    /// Queue one outbound frame. Errors only if the actor is gone; a send
    /// while disconnected is absorbed by the actor, which surfaces a
    /// `TransportError` event instead of queueing the frame.
    pub async fn send(&self, frame: ClientFrame) -> Result<()> {
        self.cmd_tx
            .send(ChannelCommand::Send(frame))
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// Close the connection if open, cancel any pending reconnect, and stop
    /// the actor. Safe to call repeatedly or when never connected.
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(ChannelCommand::Disconnect).await;
    }

    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }
}

/// Spawn the channel actor for one session. Connection is initiated
/// immediately. The returned receiver is the ordered event queue; dropping
/// it (together with the handle) stops the actor.
pub fn spawn_channel(
    connector: Arc<dyn Connector>,
    session_id: impl Into<String>,
    auth: Arc<AuthStore>,
) -> (ChannelHandle, mpsc::Receiver<ChannelEvent>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(CMD_QUEUE_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (connected_tx, connected_rx) = watch::channel(false);

    let actor = ChannelActor {
        connector,
        session_id: session_id.into(),
        auth,
        policy: ReconnectPolicy::new(),
        cmd_rx,
        event_tx,
        connected_tx,
    };
    let join = tokio::spawn(actor.run());

    (
        ChannelHandle {
            cmd_tx,
            connected_rx,
        },
        event_rx,
        join,
    )
}

enum ConnectOutcome {
    Open(WireConnection),
    /// The attempt failed in a way the reconnect policy may retry.
    Retry,
    /// Precondition failure: no credential. Never retried.
    Halt,
}

enum Driven {
    Shutdown,
    Lost,
}

enum WaitOutcome {
    Open(WireConnection),
    Failed,
    Shutdown,
    Halt,
}

struct ChannelActor {
    connector: Arc<dyn Connector>,
    session_id: String,
    auth: Arc<AuthStore>,
    policy: ReconnectPolicy,
    cmd_rx: mpsc::Receiver<ChannelCommand>,
    event_tx: mpsc::Sender<ChannelEvent>,
    connected_tx: watch::Sender<bool>,
}

impl ChannelActor {
    async fn run(mut self) {
        let mut conn = match self.attempt_connect().await {
            ConnectOutcome::Open(c) => Some(c),
            ConnectOutcome::Retry => None,
            ConnectOutcome::Halt => {
                self.idle().await;
                return;
            }
        };

        loop {
            if let Some(active) = conn.take() {
                match self.drive_connection(active).await {
                    Driven::Shutdown => return,
                    Driven::Lost => {}
                }
            }

            match self.policy.next_delay() {
                None => {
                    debug!(
                        target: LOG_TARGET,
                        session_id = %self.session_id,
                        "reconnect attempts exhausted; channel stays down"
                    );
                    self.idle().await;
                    return;
                }
                Some(delay) => match self.wait_and_reconnect(delay).await {
                    WaitOutcome::Open(c) => conn = Some(c),
                    WaitOutcome::Failed => {}
                    WaitOutcome::Shutdown => return,
                    WaitOutcome::Halt => {
                        self.idle().await;
                        return;
                    }
                },
            }
        }
    }

    /// Serve an active connection until it drops or the caller disconnects.
    async fn drive_connection(&mut self, mut conn: WireConnection) -> Driven {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ChannelCommand::Send(frame)) => {
                        if let Err(e) = self.transmit(&mut conn, &frame).await {
                            warn!(target: LOG_TARGET, err = %e, "send failed; dropping connection");
                            self.emit(ChannelEvent::TransportError(e.to_string())).await;
                            self.mark_disconnected().await;
                            return Driven::Lost;
                        }
                    }
                    Some(ChannelCommand::Disconnect) | None => {
                        self.policy.exhaust();
                        drop(conn);
                        self.mark_disconnected().await;
                        return Driven::Shutdown;
                    }
                },
                item = conn.stream.next() => match item {
                    Some(Ok(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => {
                            if !self.emit(ChannelEvent::Frame(frame)).await {
                                return Driven::Shutdown;
                            }
                        }
                        Err(err) => {
                            warn!(
                                target: LOG_TARGET,
                                %err,
                                payload_len = text.len(),
                                "dropping malformed inbound frame"
                            );
                        }
                    },
                    Some(Err(e)) => {
                        // Transport-level error; closure, if any, arrives as
                        // the end of the stream.
                        self.emit(ChannelEvent::TransportError(e.to_string())).await;
                    }
                    None => {
                        debug!(target: LOG_TARGET, session_id = %self.session_id, "study channel closed");
                        self.mark_disconnected().await;
                        return Driven::Lost;
                    }
                },
            }
        }
    }

    /// Sleep out the backoff delay, still answering commands. The pinned
    /// timer is the cancellable scheduled-attempt handle: returning from
    /// here on disconnect drops it before it fires.
    async fn wait_and_reconnect(&mut self, delay: Duration) -> WaitOutcome {
        debug!(
            target: LOG_TARGET,
            session_id = %self.session_id,
            attempt = self.policy.attempts(),
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        let timer = tokio::time::sleep(delay);
        tokio::pin!(timer);
        loop {
            tokio::select! {
                () = &mut timer => {
                    return match self.attempt_connect().await {
                        ConnectOutcome::Open(c) => WaitOutcome::Open(c),
                        ConnectOutcome::Retry => WaitOutcome::Failed,
                        ConnectOutcome::Halt => WaitOutcome::Halt,
                    };
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ChannelCommand::Send(_)) => {
                        self.reject_send().await;
                    }
                    Some(ChannelCommand::Disconnect) | None => {
                        self.policy.exhaust();
                        return WaitOutcome::Shutdown;
                    }
                },
            }
        }
    }

    /// Terminal disconnected state: no reconnect will ever be scheduled, but
    /// commands still get answered so sends surface errors instead of
    /// silently queueing.
    async fn idle(&mut self) {
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                ChannelCommand::Send(_) => self.reject_send().await,
                ChannelCommand::Disconnect => return,
            }
        }
    }

    async fn attempt_connect(&mut self) -> ConnectOutcome {
        let Some(token) = self.auth.access_token() else {
            error!(
                target: LOG_TARGET,
                session_id = %self.session_id,
                "no access token available; study channel not opened"
            );
            self.emit(ChannelEvent::TransportError(
                ClientError::MissingCredential.to_string(),
            ))
            .await;
            return ConnectOutcome::Halt;
        };

        debug!(target: LOG_TARGET, session_id = %self.session_id, "opening study channel");
        match self.connector.connect(&self.session_id, &token).await {
            Ok(conn) => {
                self.policy.reset();
                self.connected_tx.send_replace(true);
                self.emit(ChannelEvent::Connected).await;
                ConnectOutcome::Open(conn)
            }
            Err(err) => {
                warn!(target: LOG_TARGET, %err, "study channel connect failed");
                self.emit(ChannelEvent::TransportError(err.to_string())).await;
                self.emit(ChannelEvent::Disconnected).await;
                ConnectOutcome::Retry
            }
        }
    }

    async fn transmit(&self, conn: &mut WireConnection, frame: &ClientFrame) -> Result<()> {
        let text =
            serde_json::to_string(frame).map_err(|e| ClientError::Transport(e.to_string()))?;
        conn.sink.send(text).await
    }

    async fn reject_send(&self) {
        self.emit(ChannelEvent::TransportError(
            ClientError::NotConnected.to_string(),
        ))
        .await;
    }

    async fn mark_disconnected(&self) {
        self.connected_tx.send_replace(false);
        self.emit(ChannelEvent::Disconnected).await;
    }

    /// Returns false if the event queue's receiver is gone, i.e. the session
    /// is being torn down.
    async fn emit(&self, event: ChannelEvent) -> bool {
        self.event_tx.send(event).await.is_ok()
    }
}
