//! Quiz endpoints.

use lectavera_types::{Quiz, QuizGenerateRequest, QuizHistoryEntry, QuizResult, QuizSubmitRequest};

use crate::{ApiClient, Result};

impl ApiClient {
    pub async fn generate_quiz(&self, req: &QuizGenerateRequest) -> Result<Quiz> {
        self.send_json(self.http().post(self.endpoint("/quiz/generate")).json(req))
            .await
    }

    pub async fn get_quiz(&self, id: &str) -> Result<Quiz> {
        self.send_json(self.http().get(self.endpoint(&format!("/quiz/{id}"))))
            .await
    }

    pub async fn submit_quiz(&self, id: &str, req: &QuizSubmitRequest) -> Result<QuizResult> {
        self.send_json(
            self.http()
                .post(self.endpoint(&format!("/quiz/{id}/submit")))
                .json(req),
        )
        .await
    }

    pub async fn quiz_history(&self) -> Result<Vec<QuizHistoryEntry>> {
        self.send_json(self.http().get(self.endpoint("/quiz/history")))
            .await
    }
}
