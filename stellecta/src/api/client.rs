//! HTTP transport for the Stellecta REST API.
//!
//! Attaches the bearer token to every authenticated request and, on a 401,
//! refreshes the token pair once and replays the request.

use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::tokens::{TokenStore, Tokens};

const REFRESH_PATH: &str = "/auth/refresh";

/// Errors surfaced by the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach server: {0}")]
    Network(#[source] reqwest::Error),

    #[error("server returned {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("could not encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("token storage failed: {0}")]
    Tokens(#[from] std::io::Error),
}

impl ApiError {
    /// The human-readable `detail` the server attached to an error response.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

/// Authenticated JSON client bound to one API base URL.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    /// Serializes refreshes; a waiter whose token was already replaced skips its own.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: TokenStore,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// `GET` an authenticated resource.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, query, None, Auth::Bearer)
            .await
    }

    /// `POST` a JSON body to an authenticated resource.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_value(body)?;
        self.execute(Method::POST, path, &[], Some(&body), Auth::Bearer)
            .await
    }

    /// `POST` without credentials. A 401 here is returned as-is.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_value(body)?;
        self.execute(Method::POST, path, &[], Some(&body), Auth::Anonymous)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let token = self.bearer(auth)?;
        let mut response = self
            .send_once(&method, &url, query, body, token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && auth == Auth::Bearer
            && self.refresh(token.as_deref()).await?
        {
            debug!(%method, %url, "retrying after token refresh");
            let token = self.bearer(auth)?;
            response = self
                .send_once(&method, &url, query, body, token.as_deref())
                .await?;
        }

        decode(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        debug!(%method, %url, "api request");
        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(ApiError::Network)
    }

    fn bearer(&self, auth: Auth) -> Result<Option<String>, ApiError> {
        if auth == Auth::Anonymous {
            return Ok(None);
        }
        Ok(self.tokens.load()?.map(|tokens| tokens.access_token))
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// `rejected` is the access token the failed request carried. If the
    /// stored token already differs, another request refreshed it while this
    /// one waited and the stored pair is reused as is.
    ///
    /// Returns `Ok(false)` when there is nothing to refresh with. A rejected
    /// refresh clears the stored tokens and yields `SessionExpired`.
    async fn refresh(&self, rejected: Option<&str>) -> Result<bool, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(stored) = self.tokens.load()? else {
            return Ok(false);
        };
        if rejected != Some(stored.access_token.as_str()) {
            debug!("token already refreshed by another request");
            return Ok(true);
        }
        let Some(refresh_token) = stored.refresh_token.clone() else {
            return Ok(false);
        };

        let url = format!("{}{REFRESH_PATH}", self.base_url);
        let outcome = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let refreshed = match outcome {
            Ok(response) if response.status().is_success() => {
                response.json::<RefreshResponse>().await.ok()
            }
            Ok(response) => {
                warn!(status = %response.status(), "token refresh rejected");
                None
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                None
            }
        };

        match refreshed {
            Some(fresh) => {
                self.tokens.save(&Tokens {
                    access_token: fresh.access_token,
                    refresh_token: fresh.refresh_token.or(Some(refresh_token)),
                })?;
                Ok(true)
            }
            None => {
                self.tokens.clear()?;
                Err(ApiError::SessionExpired)
            }
        }
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::Encode)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(ApiError::Decode);
    }

    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(String::from));
    warn!(%status, detail = detail.as_deref().unwrap_or("-"), "api error");
    Err(ApiError::Status { status, detail })
}
