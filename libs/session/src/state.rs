//! Session state store
//!
//! The single source of truth for "is a user logged in, and who/what role
//! are they". Constructed once at application start and passed to whatever
//! needs it; route guards and the front end read identity through it and
//! drive the session through `login`/`logout`/`check_auth`.

use std::sync::{Arc, RwLock};

use reqwest::{Method, StatusCode};
use tracing::{error, info, warn};

use common::{AuthError, AuthResult, validation};

use crate::client::{ApiClient, CHECK_PATH, LOGIN_PATH, LOGOUT_PATH, SIGNUP_PATH};
use crate::models::{AuthUser, CheckResponse, LoginRequest, LoginResponse, SignupRequest};

/// Current session state as exposed to consumers.
///
/// `is_loading` stays true until the initial `check_auth` completes, letting
/// route guards distinguish "still determining session" from "confirmed
/// logged out". Invariant: `is_logged_in` implies `user` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub is_logged_in: bool,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_logged_in: false,
            is_loading: true,
        }
    }
}

/// Session operations and identity for the rest of the application
pub struct SessionStore {
    client: Arc<ApiClient>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create a store over an authorized client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Snapshot of the current session state
    pub fn current(&self) -> SessionState {
        self.read_state().clone()
    }

    /// Currently authenticated user, if any
    pub fn user(&self) -> Option<AuthUser> {
        self.read_state().user.clone()
    }

    /// Whether a user is currently logged in
    pub fn is_logged_in(&self) -> bool {
        self.read_state().is_logged_in
    }

    /// Whether the initial session check is still in flight
    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    /// The client this store drives; member API consumers share it so every
    /// call carries the session's credentials
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }

    /// Log in with email and password.
    ///
    /// Invalid credentials surface as `InvalidCredentials` carrying the
    /// server's message; the caller owns user-facing messaging. Success
    /// persists both tokens and hydrates the session state.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        info!("Login attempt for user: {}", email);

        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response = self
            .client
            .auth_request(Method::POST, LOGIN_PATH, Some(body))
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let message = ApiClient::response_message(response).await;
            return Err(AuthError::InvalidCredentials(message));
        }
        if !status.is_success() {
            error!("Login failed with status {}", status);
            return Err(AuthError::Server(status.as_u16()));
        }

        let body: LoginResponse = response.json().await?;
        self.client
            .install_tokens(&body.access_token, &body.refresh_token);

        {
            let mut state = self.write_state();
            state.user = Some(body.user.clone());
            state.is_logged_in = true;
            state.is_loading = false;
        }

        info!("Login successful for user: {}", body.user.email);
        Ok(body.user)
    }

    /// Log out.
    ///
    /// The server is notified best-effort; a failed notification is logged
    /// and never blocks clearing local state.
    pub async fn logout(&self) {
        match self
            .client
            .auth_request(Method::POST, LOGOUT_PATH, None)
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!("Server logout returned status {}", response.status());
            }
            Err(err) => {
                warn!("Server logout failed: {}", err);
            }
            Ok(_) => {}
        }

        self.client.clear_tokens();
        self.clear_state();
        info!("Logged out");
    }

    /// Restore the session at application start.
    ///
    /// With no persisted credentials this settles immediately into the
    /// logged-out state. Otherwise the session-check endpoint decides; any
    /// failure clears local state without notifying the server. `is_loading`
    /// becomes false on every exit path.
    pub async fn check_auth(&self) {
        if !self.client.has_credentials() {
            self.clear_state();
            return;
        }

        match self
            .client
            .auth_request(Method::GET, CHECK_PATH, None)
            .await
        {
            Ok(response) if response.status().is_success() => {
                match response.json::<CheckResponse>().await {
                    Ok(CheckResponse {
                        is_logged_in: true,
                        user: Some(user),
                    }) => {
                        info!("Session restored for user: {}", user.email);
                        let mut state = self.write_state();
                        state.user = Some(user);
                        state.is_logged_in = true;
                        state.is_loading = false;
                    }
                    Ok(_) => {
                        info!("Session check reports logged out");
                        self.client.clear_tokens();
                        self.clear_state();
                    }
                    Err(err) => {
                        warn!("Session check returned malformed body: {}", err);
                        self.client.clear_tokens();
                        self.clear_state();
                    }
                }
            }
            Ok(response) => {
                info!("Session check rejected with status {}", response.status());
                self.client.clear_tokens();
                self.clear_state();
            }
            Err(err) => {
                warn!("Session check failed: {}", err);
                self.client.clear_tokens();
                self.clear_state();
            }
        }
    }

    /// Create a new account.
    ///
    /// Validates inputs client-side, then registers with the server. Does
    /// not log the new account in.
    pub async fn signup(&self, email: &str, password: &str) -> AuthResult<String> {
        validation::validate_email(email)?;
        validation::validate_password(password)?;

        let body = serde_json::to_value(SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response = self
            .client
            .auth_request(Method::POST, SIGNUP_PATH, Some(body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = ApiClient::response_message(response).await;
            return Err(AuthError::Validation(message));
        }

        let message = ApiClient::response_message(response).await;
        info!("Account created for user: {}", email);
        Ok(message)
    }

    #[cfg(test)]
    pub(crate) fn set_state_for_tests(&self, user: AuthUser) {
        let mut state = self.write_state();
        state.user = Some(user);
        state.is_logged_in = true;
        state.is_loading = false;
    }

    fn clear_state(&self) {
        let mut state = self.write_state();
        state.user = None;
        state.is_logged_in = false;
        state.is_loading = false;
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().expect("session state lock poisoned")
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().expect("session state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_loading_and_logged_out() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert!(!state.is_logged_in);
        assert!(state.user.is_none());
    }
}
