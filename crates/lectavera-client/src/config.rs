/// Connection configuration for the streaming client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the study WebSocket endpoint; the session id and bearer
    /// token are appended at connect time.
    pub ws_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // Matches the backend's local development default.
            ws_base_url: "ws://localhost:8000".to_string(),
        }
    }
}
