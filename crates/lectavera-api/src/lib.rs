//! REST client for the Lectavera backend.
//!
//! A thin typed layer over `reqwest`: every call attaches the bearer token
//! from the shared [`AuthStore`], and a 401 triggers one token refresh
//! followed by a single retry of the original request. Streaming chat does
//! not go through here; that is `lectavera-client`'s WebSocket channel.

use std::sync::Arc;
use std::time::Duration;

use lectavera_auth::{AuthStore, TokenPair};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

mod analytics;
mod auth;
mod documents;
mod error;
mod quiz;
mod study;

pub use auth::{LoginRequest, SignupRequest};
pub use documents::{DocumentFilter, DocumentUpdate};
pub use error::{ApiError, Result};
pub use study::CreateSessionRequest;

const LOG_TARGET: &str = "lectavera_api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the backend's REST surface.
///
/// Cloning is cheap; the underlying connection pool and the credential store
/// are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthStore>,
}

/// Error body shape the backend uses for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the versioned API root, e.g.
    /// `http://localhost:8000/api/v1`.
    pub fn new(base_url: impl Into<String>, auth: Arc<AuthStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send with bearer auth and the refresh-and-retry-once flow, then
    /// decode the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = self.send(req).await?;
        Ok(response.json().await?)
    }

    /// Like [`Self::send_json`] for endpoints with no response body.
    pub(crate) async fn send_empty(&self, req: RequestBuilder) -> Result<()> {
        self.send(req).await?;
        Ok(())
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        // The clone is taken before auth so the retry picks up the
        // refreshed token. Bodies used here are always cloneable JSON.
        let retry = req.try_clone();
        let response = self.authorize(req).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_status(response).await;
        }

        let Some(retry) = retry else {
            return Err(ApiError::Unauthorized);
        };
        self.refresh_tokens().await?;
        debug!(target: LOG_TARGET, "retrying request after token refresh");
        let response = self.authorize(retry).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // The refreshed credential was rejected too; treat it as dead.
            self.auth.clear();
            return Err(ApiError::Unauthorized);
        }
        Self::check_status(response).await
    }

    /// Exchange the stored refresh token for a new pair. Clears the store
    /// and returns `Unauthorized` if there is no refresh token or the
    /// backend rejects it.
    async fn refresh_tokens(&self) -> Result<()> {
        let Some(refresh_token) = self.auth.refresh_token() else {
            self.auth.clear();
            return Err(ApiError::Unauthorized);
        };

        let response = self
            .http
            .post(self.endpoint("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(target: LOG_TARGET, status = %response.status(), "token refresh rejected");
            self.auth.clear();
            return Err(ApiError::Unauthorized);
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.auth.set_tokens(TokenPair {
            access_token: refreshed.access_token,
            // The backend may rotate only the access token.
            refresh_token: refreshed.refresh_token.unwrap_or(refresh_token),
        });
        debug!(target: LOG_TARGET, "access token refreshed");
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        Err(ApiError::Status {
            code: status.as_u16(),
            detail,
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn auth(&self) -> &AuthStore {
        &self.auth
    }
}
