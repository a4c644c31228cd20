//! Study session CRUD. The live chat itself runs over the WebSocket channel
//! in `lectavera-client`; these endpoints manage the persisted sessions.

use lectavera_types::{SessionWithMessages, StudyMode, StudySession};
use serde::Serialize;

use crate::{ApiClient, Result};

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest {
    pub selected_document_ids: Vec<String>,
    pub mode: StudyMode,
}

impl ApiClient {
    pub async fn create_session(&self, req: &CreateSessionRequest) -> Result<StudySession> {
        self.send_json(self.http().post(self.endpoint("/study/sessions")).json(req))
            .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<StudySession>> {
        self.send_json(self.http().get(self.endpoint("/study/sessions")))
            .await
    }

    /// Session detail including the persisted transcript.
    pub async fn get_session(&self, id: &str) -> Result<SessionWithMessages> {
        self.send_json(
            self.http()
                .get(self.endpoint(&format!("/study/sessions/{id}"))),
        )
        .await
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.http()
                .delete(self.endpoint(&format!("/study/sessions/{id}"))),
        )
        .await
    }
}
