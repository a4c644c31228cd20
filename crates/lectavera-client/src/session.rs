//! The session client facade.
//!
//! [`StudySessionClient`] is the single entry point the chat UI consumes:
//! construct it with a session id, observe the connection flag, send user
//! turns, read the transcript. Internally a session actor owns the
//! [`Transcript`] and drains the channel's event queue in delivery order, so
//! every mutation happens on one logical loop.

use std::sync::Arc;

use lectavera_auth::AuthStore;
use lectavera_types::{Message, StudyMode};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transcript::Transcript;
use crate::transport::channel::{ChannelEvent, ChannelHandle, Connector, WsConnector, spawn_channel};
use crate::transport::protocol::{ClientFrame, ServerFrame};

const LOG_TARGET: &str = "lectavera_client::session";

const CMD_QUEUE_CAPACITY: usize = 32;
const EVENT_BROADCAST_CAPACITY: usize = 256;

/// Events re-broadcast to facade subscribers, in the order the channel
/// delivered the underlying events.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    /// The transcript changed: a user turn was appended, a streaming entry
    /// grew, or the tail was finalized or aborted.
    TranscriptUpdated,
    /// The backend aborted the current stream. The partial entry stays in
    /// the transcript, already resolved to non-streaming; this event is the
    /// only place the abort is distinguishable from a plain completion.
    StreamError { message: String },
    /// A transport-level problem (failed send, failed connect attempt,
    /// malformed handshake). Does not imply the transcript changed.
    TransportError { message: String },
}

enum SessionCmd {
    SendMessage {
        content: String,
        mode: StudyMode,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Message>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Facade over one study session's streaming channel and transcript.
///
/// Cheap to clone-by-handle semantics are deliberately not provided: one
/// facade instance exclusively owns its transcript.
pub struct StudySessionClient {
    session_id: String,
    cmd_tx: mpsc::Sender<SessionCmd>,
    connected_rx: watch::Receiver<bool>,
    events: broadcast::Sender<SessionEvent>,
}

impl StudySessionClient {
    /// Construct and immediately initiate the connection for `session_id`,
    /// reading the bearer credential from `auth` at connect time.
    pub fn connect(
        session_id: impl Into<String>,
        auth: Arc<AuthStore>,
        config: &ClientConfig,
    ) -> Self {
        Self::connect_with(
            Arc::new(WsConnector::new(config.ws_base_url.clone())),
            session_id,
            auth,
        )
    }

    /// Like [`Self::connect`] but with an explicit connector; the seam the
    /// tests use.
    pub fn connect_with(
        connector: Arc<dyn Connector>,
        session_id: impl Into<String>,
        auth: Arc<AuthStore>,
    ) -> Self {
        let session_id = session_id.into();
        let (channel, channel_events, _channel_task) =
            spawn_channel(connector, session_id.clone(), auth);
        let connected_rx = channel.watch_connected();

        let (cmd_tx, cmd_rx) = mpsc::channel(CMD_QUEUE_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);

        let actor = SessionActor {
            session_id: session_id.clone(),
            transcript: Transcript::new(),
            channel,
            channel_events,
            cmd_rx,
            events: events.clone(),
        };
        tokio::spawn(actor.run());

        Self {
            session_id,
            cmd_tx,
            connected_rx,
            events,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Append a user turn to the transcript and forward it over the channel.
    ///
    /// The append happens unconditionally; if the channel is down the frame
    /// is not transmitted and a [`SessionEvent::TransportError`] surfaces
    /// instead. Returns an error only if the session is already shut down.
    pub async fn send_message(&self, content: impl Into<String>, mode: StudyMode) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(SessionCmd::SendMessage {
                content: content.into(),
                mode,
                reply,
            })
            .await
            .map_err(|_| ClientError::ChannelClosed)?;
        rx.await.map_err(|_| ClientError::ChannelClosed)?
    }

    /// Snapshot of the transcript in order.
    pub async fn transcript(&self) -> Result<Vec<Message>> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(SessionCmd::Snapshot { reply })
            .await
            .map_err(|_| ClientError::ChannelClosed)?;
        rx.await.map_err(|_| ClientError::ChannelClosed)
    }

    /// Tear the session down: close the socket, cancel any pending
    /// reconnect, and stop both actors. When this returns, no further
    /// [`SessionEvent`] will be delivered. Idempotent.
    pub async fn disconnect(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(SessionCmd::Shutdown { reply })
            .await
            .is_err()
        {
            // Already shut down.
            return;
        }
        let _ = rx.await;
    }
}

struct SessionActor {
    session_id: String,
    transcript: Transcript,
    channel: ChannelHandle,
    channel_events: mpsc::Receiver<ChannelEvent>,
    cmd_rx: mpsc::Receiver<SessionCmd>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(SessionCmd::SendMessage { content, mode, reply }) => {
                        // User entry first, then the wire forward; the entry
                        // stays even if the channel rejects the send.
                        self.transcript.push_user(&content, mode);
                        self.broadcast(SessionEvent::TranscriptUpdated);
                        let result = self.channel.send(ClientFrame { content, mode }).await;
                        let _ = reply.send(result);
                    }
                    Some(SessionCmd::Snapshot { reply }) => {
                        let _ = reply.send(self.transcript.messages().to_vec());
                    }
                    Some(SessionCmd::Shutdown { reply }) => {
                        self.shutdown().await;
                        let _ = reply.send(());
                        return;
                    }
                    None => {
                        // Facade dropped without an explicit disconnect.
                        self.shutdown().await;
                        return;
                    }
                },
                event = self.channel_events.recv() => match event {
                    Some(event) => self.apply_channel_event(event),
                    None => {
                        debug!(target: LOG_TARGET, session_id = %self.session_id, "channel actor ended");
                        return;
                    }
                },
            }
        }
    }

    /// Stop the channel, then drain its remaining events so everything that
    /// happened before the close is still delivered; after this returns the
    /// subscriber stream is silent.
    async fn shutdown(&mut self) {
        self.channel.disconnect().await;
        while let Some(event) = self.channel_events.recv().await {
            self.apply_channel_event(event);
        }
    }

    fn apply_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => self.broadcast(SessionEvent::Connected),
            ChannelEvent::Disconnected => self.broadcast(SessionEvent::Disconnected),
            ChannelEvent::TransportError(message) => {
                self.broadcast(SessionEvent::TransportError { message });
            }
            ChannelEvent::Frame(frame) => {
                let aborted = match &frame {
                    ServerFrame::Error { message } => Some(message.clone()),
                    _ => None,
                };
                // An error frame with no streaming tail is dropped by the
                // accumulator; stay silent then so StreamError always has a
                // resolved entry behind it.
                if self.transcript.apply(frame) {
                    self.broadcast(SessionEvent::TranscriptUpdated);
                    if let Some(message) = aborted {
                        self.broadcast(SessionEvent::StreamError { message });
                    }
                }
            }
        }
    }

    fn broadcast(&self, event: SessionEvent) {
        // Lagging or absent subscribers are fine; the transcript snapshot is
        // the source of truth.
        let _ = self.events.send(event);
    }
}
