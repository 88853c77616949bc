//! REST client wrappers around the admission service.
//!
//! One [`ApiClient`] holds the pooled HTTP client, the environment-driven
//! base URL, and the session store. The bearer "interceptor" contract
//! lives in [`ApiClient::authed`] and [`ApiClient::send`]: an expired
//! token is refused locally before any traffic, and any 401 clears the
//! session.

pub mod application;
pub mod auth;
pub mod files;
pub mod lookup;

use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{Session, SessionStore};

/// HTTP client for the admission API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
}

/// Error payload shape returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ClientError::from_reqwest)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store: SessionStore::new(&config.session_path),
        })
    }

    /// The session store this client attaches tokens from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current non-expired session. An expired token is refused (and the
    /// store cleared) locally, without hitting the network.
    pub(crate) fn require_session(&self) -> Result<Session, ClientError> {
        match self.store.load()? {
            Some(session) if !session.is_expired() => Ok(session),
            Some(_) => {
                self.store.clear()?;
                Err(ClientError::SessionExpired)
            }
            None => Err(ClientError::SessionExpired),
        }
    }

    /// Attach the bearer header for an authenticated request.
    fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let session = self.require_session()?;
        Ok(builder.bearer_auth(session.token))
    }

    /// Send a request: transport failures are classified, a 401 clears
    /// the session, and other non-2xx statuses become [`ClientError::Api`].
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await.map_err(ClientError::from_reqwest)?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.store.clear()?;
            return Err(ClientError::SessionExpired);
        }
        Self::ensure_success(response).await
    }

    /// Ensure the response has a success status code; on failure, pull
    /// the server's `message` string out of the body when there is one.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        response.json::<T>().await.map_err(ClientError::from_reqwest)
    }

    /// GET a JSON resource.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        Self::parse_response(response).await
    }
}
