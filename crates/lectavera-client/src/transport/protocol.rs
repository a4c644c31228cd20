//! Wire frames for the study-session channel.
//!
//! One JSON object per WebSocket text frame, in both directions. Inbound
//! frames are discriminated by `type`; anything that fails to parse is
//! dropped at the channel boundary and never reaches the transcript.

use lectavera_types::{Citation, StudyMode, Verdict};
use serde::{Deserialize, Serialize};

/// Server → client frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// An incremental fragment of assistant output.
    Chunk { content: String },
    /// End of streaming for the current assistant entry, with the structured
    /// completion metadata.
    Complete {
        citations: Vec<Citation>,
        verdict: Verdict,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        follow_up: Option<String>,
    },
    /// Abnormal end of streaming. Partial content already delivered is kept;
    /// no metadata is attached.
    Error { message: String },
}

/// Client → server frame: one user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub content: String,
    pub mode: StudyMode,
}
