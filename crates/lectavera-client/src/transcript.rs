//! The message accumulator: an ordered transcript with a single mutable
//! streaming tail.
//!
//! The transcript is append-only except for the last entry while it streams
//! (content growth) and at finalization (metadata attach). At most one entry
//! is ever in streaming state, and it is always the tail. User entries are
//! immutable after creation.

use lectavera_types::{Message, StudyMode};
use tracing::warn;

use crate::transport::protocol::ServerFrame;

const LOG_TARGET: &str = "lectavera_client::transcript";

/// Ordered conversation transcript for one study session.
///
/// Inbound frames are applied strictly in the order the channel delivers
/// them; there is no reordering or buffering here. The transcript survives
/// reconnects untouched. An assistant entry whose stream never completes is
/// left in streaming state indefinitely; after a frame-level `error` it is
/// resolved to non-streaming with its partial content retained and no
/// metadata, indistinguishable from a completion that carried none.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a user turn. Always appends, regardless of streaming state;
    /// gating input during a stream is the UI's concern, not the
    /// accumulator's.
    pub fn push_user(&mut self, content: &str, mode: StudyMode) {
        self.messages.push(Message::user(content, mode));
    }

    /// Apply one inbound frame to the tail state machine. Returns `true` if
    /// the transcript changed.
    pub fn apply(&mut self, frame: ServerFrame) -> bool {
        match frame {
            ServerFrame::Chunk { content } => {
                if let Some(last) = self.messages.last_mut()
                    && last.is_assistant()
                    && last.is_streaming
                {
                    last.content.push_str(&content);
                } else {
                    self.messages.push(Message::streaming_assistant(content));
                }
                true
            }
            ServerFrame::Complete {
                citations,
                verdict,
                follow_up,
            } => {
                let Some(last) = self.streaming_tail_mut() else {
                    warn!(target: LOG_TARGET, "dropping complete frame with no streaming entry");
                    return false;
                };
                last.citations = citations;
                last.verdict = Some(verdict);
                last.follow_up = follow_up;
                last.is_streaming = false;
                true
            }
            ServerFrame::Error { message } => {
                let Some(last) = self.streaming_tail_mut() else {
                    warn!(target: LOG_TARGET, %message, "dropping error frame with no streaming entry");
                    return false;
                };
                // Partial content stays; no metadata is attached.
                last.is_streaming = false;
                true
            }
        }
    }

    fn streaming_tail_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .last_mut()
            .filter(|m| m.is_assistant() && m.is_streaming)
    }
}
