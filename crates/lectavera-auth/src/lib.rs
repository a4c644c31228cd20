//! Credential store for the Lectavera clients.
//!
//! The store is constructed explicitly and passed into whatever needs it
//! (the WebSocket connector reads the access token at connect time, the REST
//! client attaches it per request and rotates it on refresh). There is no
//! process-wide singleton; share one `Arc<AuthStore>` instead.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Default)]
struct TokenState {
    tokens: Option<TokenPair>,
}

/// Thread-safe holder for the current credential.
///
/// Reads are synchronous; the streaming client only looks at the access token
/// when it opens a connection and never refreshes it mid-connection.
#[derive(Debug, Default)]
pub struct AuthStore {
    state: RwLock<TokenState>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with a token pair.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        let store = Self::new();
        store.set_tokens(tokens);
        store
    }

    /// Replace the stored pair. Called after login and after every refresh.
    pub fn set_tokens(&self, tokens: TokenPair) {
        self.state.write().tokens = Some(tokens);
    }

    /// Current bearer credential, if any.
    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .read()
            .tokens
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().tokens.is_some()
    }

    /// Drop the stored credential, e.g. after a failed refresh or logout.
    pub fn clear(&self) {
        self.state.write().tokens = None;
    }
}
