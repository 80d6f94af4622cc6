//! Authorized HTTP client: request and response/refresh interceptors
//!
//! Every outgoing request picks up the current access token from an
//! in-memory cache (never from disk, never from the network). A 401 response
//! triggers at most one refresh-and-retry per request; refreshes are
//! single-flight across concurrent failures. A failed refresh clears the
//! credential store, notifies the navigator, and rejects the caller with
//! `RefreshFailed`. All other failure statuses pass through unchanged.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use common::{AuthError, AuthResult};

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::models::{ApiMessage, RefreshResponse};
use crate::navigator::Navigator;

pub(crate) const LOGIN_PATH: &str = "/api/auth/login";
pub(crate) const LOGOUT_PATH: &str = "/api/auth/logout";
pub(crate) const CHECK_PATH: &str = "/api/auth/check";
pub(crate) const REFRESH_PATH: &str = "/api/auth/refresh";
pub(crate) const SIGNUP_PATH: &str = "/api/auth/signup";

/// In-memory mirror of the persisted credentials.
///
/// `generation` increments on every token mutation; a request that failed
/// with 401 under one generation can tell whether a concurrent task already
/// refreshed before it acquired the refresh gate.
#[derive(Debug, Default)]
struct TokenCache {
    access: Option<String>,
    refresh: Option<String>,
    generation: u64,
}

/// An in-flight call, owned so the single permitted retry can re-dispatch it
/// unchanged apart from the refreshed bearer header.
struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl PendingRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    fn with_body(method: Method, path: &str, body: serde_json::Value) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        }
    }
}

/// HTTP client for the directory backend with automatic session refresh
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: RwLock<TokenCache>,
    store: Arc<dyn CredentialStore>,
    refresh_gate: Mutex<()>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client over a credential store and navigator.
    ///
    /// Persisted credentials are hydrated into the in-memory cache here, so
    /// a restarted process resumes attaching its stored access token
    /// immediately.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut cache = TokenCache::default();
        if let Some(persisted) = store.load()? {
            cache.access = persisted.access_token;
            cache.refresh = persisted.refresh_token;
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            tokens: RwLock::new(cache),
            store,
            refresh_gate: Mutex::new(()),
            navigator,
        })
    }

    /// Whether any credential material is cached
    pub fn has_credentials(&self) -> bool {
        let cache = self.read_cache();
        cache.access.is_some() || cache.refresh.is_some()
    }

    /// GET a JSON resource through the full interceptor chain
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        let response = self.send(PendingRequest::new(Method::GET, path)).await?;
        Self::into_json(response).await
    }

    /// GET a JSON resource with query parameters
    pub async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AuthResult<T> {
        let mut request = PendingRequest::new(Method::GET, path);
        request.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = self.send(request).await?;
        Self::into_json(response).await
    }

    /// POST a JSON body and decode the JSON response, through the full
    /// interceptor chain
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AuthResult<T> {
        let body = serde_json::to_value(body)?;
        let response = self
            .send(PendingRequest::with_body(Method::POST, path, body))
            .await?;
        Self::into_json(response).await
    }

    /// DELETE a resource through the full interceptor chain
    pub async fn delete(&self, path: &str) -> AuthResult<()> {
        let response = self.send(PendingRequest::new(Method::DELETE, path)).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::status_error(status, Self::response_message(response).await))
    }

    /// Dispatch an auth-lifecycle request (login, logout, check, refresh,
    /// signup) with the current bearer token but without the refresh-retry
    /// path, preventing recursion on the endpoints that manage the session
    /// itself.
    pub(crate) async fn auth_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> AuthResult<reqwest::Response> {
        let request = PendingRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body,
        };
        let token = self.read_cache().access.clone();
        self.dispatch(&request, token.as_deref()).await
    }

    /// Install a freshly established session's tokens into the cache and the
    /// durable store
    pub(crate) fn install_tokens(&self, access_token: &str, refresh_token: &str) {
        {
            let mut cache = self.write_cache();
            cache.access = Some(access_token.to_string());
            cache.refresh = Some(refresh_token.to_string());
            cache.generation += 1;
        }
        self.persist();
    }

    /// Clear the cache and the durable store (logout, failed session check)
    pub(crate) fn clear_tokens(&self) {
        {
            let mut cache = self.write_cache();
            cache.access = None;
            cache.refresh = None;
            cache.generation += 1;
        }
        if let Err(err) = self.store.clear() {
            error!("Failed to clear credential store: {}", err);
        }
    }

    /// Send a request with bearer attachment and the single-retry refresh
    /// policy
    async fn send(&self, request: PendingRequest) -> AuthResult<reqwest::Response> {
        let (token, generation) = {
            let cache = self.read_cache();
            (cache.access.clone(), cache.generation)
        };

        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // One refresh-and-retry per request; a second 401 propagates to the
        // caller via into_json/status mapping.
        let fresh = self.refresh_access_token(generation).await?;
        debug!("Retrying {} {} with refreshed token", request.method, request.path);
        self.dispatch(&request, Some(&fresh)).await
    }

    /// Pure request augmentation and dispatch: attach the bearer header if a
    /// token is present, send, surface transport errors as `Network`
    async fn dispatch(
        &self,
        request: &PendingRequest,
        token: Option<&str>,
    ) -> AuthResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|err| {
            warn!("Request to {} failed: {}", url, err);
            AuthError::Network(err)
        })?;
        Ok(response)
    }

    /// Obtain a valid access token after a 401, refreshing at most once
    /// across all concurrent failures.
    ///
    /// `seen_generation` is the cache generation the failing request
    /// dispatched with. If the generation moved while we waited for the
    /// gate, another task already refreshed and its token is reused.
    async fn refresh_access_token(&self, seen_generation: u64) -> AuthResult<String> {
        let _gate = self.refresh_gate.lock().await;

        {
            let cache = self.read_cache();
            if cache.generation != seen_generation {
                if let Some(access) = cache.access.clone() {
                    debug!("Reusing access token refreshed by a concurrent request");
                    return Ok(access);
                }
            }
        }

        let Some(refresh_token) = self.read_cache().refresh.clone() else {
            warn!("Access token rejected and no refresh token is stored");
            return Err(self.fail_session("no refresh credential available"));
        };

        info!("Access token rejected, refreshing session");
        let request = PendingRequest::new(Method::POST, REFRESH_PATH);
        let response = match self.dispatch(&request, Some(&refresh_token)).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail_session(&err.to_string())),
        };

        if !response.status().is_success() {
            let status = response.status();
            return Err(self.fail_session(&format!("refresh endpoint returned {}", status)));
        }

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => return Err(self.fail_session(&err.to_string())),
        };

        {
            let mut cache = self.write_cache();
            cache.access = Some(body.access_token.clone());
            cache.generation += 1;
        }
        self.persist();

        info!("Session refreshed");
        Ok(body.access_token)
    }

    /// Terminal refresh failure: clear everything, send the user to the
    /// login entry point, and hand back the error the caller rejects with
    fn fail_session(&self, reason: &str) -> AuthError {
        error!("Session refresh failed: {}", reason);
        self.clear_tokens();
        self.navigator.redirect_to_login();
        AuthError::RefreshFailed(reason.to_string())
    }

    /// Write the current cache contents through to the durable store
    fn persist(&self) {
        let credentials = {
            let cache = self.read_cache();
            Credentials {
                access_token: cache.access.clone(),
                refresh_token: cache.refresh.clone(),
                logged_in: cache.access.is_some(),
            }
        };
        if let Err(err) = self.store.save(&credentials) {
            error!("Failed to persist credentials: {}", err);
        }
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, TokenCache> {
        self.tokens.read().expect("token cache lock poisoned")
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, TokenCache> {
        self.tokens.write().expect("token cache lock poisoned")
    }

    /// Map a completed response to its decoded body or the appropriate error
    async fn into_json<T: DeserializeOwned>(response: reqwest::Response) -> AuthResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = Self::response_message(response).await;
        Err(Self::status_error(status, message))
    }

    /// Error taxonomy for non-auth-lifecycle responses. 401 here means the
    /// single retry was already spent.
    fn status_error(status: StatusCode, message: String) -> AuthError {
        match status {
            StatusCode::UNAUTHORIZED => AuthError::SessionExpired,
            StatusCode::FORBIDDEN => {
                warn!("Request forbidden: {}", message);
                AuthError::Forbidden(message)
            }
            status if status.is_server_error() => {
                error!("Server error {}: {}", status, message);
                AuthError::Server(status.as_u16())
            }
            _ => AuthError::Validation(message),
        }
    }

    /// Best-effort extraction of the backend's `{"message": ...}` body
    pub(crate) async fn response_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ApiMessage>().await {
            Ok(body) => body.message,
            Err(_) => format!("request failed with status {}", status),
        }
    }
}
