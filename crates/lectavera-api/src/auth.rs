//! Account endpoints. Login and signup write the issued token pair into the
//! shared store; logout clears it.

use lectavera_auth::TokenPair;
use lectavera_types::{AuthResponse, User};
use serde::Serialize;

use crate::{ApiClient, Result};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

impl ApiClient {
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .send_json(self.http().post(self.endpoint("/auth/login")).json(req))
            .await?;
        self.store_tokens(&response);
        Ok(response)
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .send_json(self.http().post(self.endpoint("/auth/signup")).json(req))
            .await?;
        self.store_tokens(&response);
        Ok(response)
    }

    pub async fn me(&self) -> Result<User> {
        self.send_json(self.http().get(self.endpoint("/auth/me")))
            .await
    }

    /// Best-effort server-side logout; the local store is cleared regardless
    /// of the outcome.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .send_empty(self.http().post(self.endpoint("/auth/logout")))
            .await;
        self.auth().clear();
        result
    }

    fn store_tokens(&self, response: &AuthResponse) {
        self.auth().set_tokens(TokenPair {
            access_token: response.tokens.access_token.clone(),
            refresh_token: response.tokens.refresh_token.clone(),
        });
    }
}
