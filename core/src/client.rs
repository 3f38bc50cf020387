//! Authenticated API client.
//!
//! # Design
//! `ApiClient` keeps the split between building and parsing: `build` produces
//! an `HttpRequest` from an `ApiRequest` and the stored token, `parse` turns
//! the `HttpResponse` into a value or a single `ApiError`. `fetch` runs
//! build → transport → parse. Both halves are usable on their own when the
//! host wants to execute the round-trip itself.
//!
//! The only side effects live in `parse`, on an expired session: the stored
//! token is dropped (best-effort) and the navigator is sent to the login view
//! with the current location as `redirect`. Requests that do not require auth
//! never trigger either, whatever the status.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::navigator::{login_redirect_url, NavigateOptions, Navigator};
use crate::request::{build_request, ApiRequest};
use crate::response::{classify, Payload, ResponseOutcome};
use crate::transport::Transport;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const ME_PATH: &str = "/auth/me";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// View the navigator is sent to when the session expires.
pub const DEFAULT_LOGIN_ROUTE: &str = "/auth/login";

pub struct ApiClient {
    base_url: String,
    login_route: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            transport,
            credentials,
            navigator,
        }
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(&config.api_base_url, transport, credentials, navigator)
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn build(&self, request: &ApiRequest) -> Result<HttpRequest, ApiError> {
        let token = if request.requires_auth {
            self.credentials.get()
        } else {
            None
        };
        build_request(&self.base_url, request, token.as_deref())
    }

    pub fn parse(&self, request: &ApiRequest, response: HttpResponse) -> Result<Payload, ApiError> {
        let outcome = classify(
            response.status,
            response.content_type(),
            &response.body,
            request.requires_auth,
        );
        match outcome {
            ResponseOutcome::Success(payload) => Ok(payload),
            ResponseOutcome::ClientError { status, message } => {
                debug!(status, path = %request.path, %message, "request failed");
                Err(ApiError::Client { status, message })
            }
            ResponseOutcome::AuthExpired { status } => {
                self.expire_session(status);
                Err(ApiError::AuthRedirect)
            }
        }
    }

    pub async fn fetch(&self, request: ApiRequest) -> Result<Payload, ApiError> {
        let http_request = self.build(&request)?;
        debug!(
            method = %http_request.method,
            url = %http_request.url,
            auth = request.requires_auth,
            "sending request"
        );
        let response = self.transport.send(http_request).await?;
        self.parse(&request, response)
    }

    /// `fetch`, then deserialize the payload into `T`. A text payload is
    /// offered to `T` as a JSON string; an absent one as `null`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let payload = self.fetch(request).await?;
        serde_json::from_value(payload.into_value())
            .map_err(|e| ApiError::UnexpectedPayload(e.to_string()))
    }

    /// Clearing the token and navigating are independent: a storage failure
    /// is logged and the redirect still happens.
    fn expire_session(&self, status: u16) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "failed to clear credential after auth expiry");
        }
        let location = self
            .navigator
            .current_location()
            .unwrap_or_else(|| "/".to_string());
        let target = login_redirect_url(&self.login_route, &location);
        info!(status, %location, "session expired, redirecting to login");
        self.navigator.navigate_to(
            &target,
            NavigateOptions {
                replace_history: true,
            },
        );
    }

    /// Exchange credentials for a token. Storing the token is the caller's job.
    pub async fn login(&self, payload: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.fetch_json(ApiRequest::post(LOGIN_PATH).json(payload)?).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.fetch_json(ApiRequest::post(REGISTER_PATH).json(payload)?).await
    }

    pub async fn dashboard(&self) -> Result<Value, ApiError> {
        let payload = self.fetch(ApiRequest::get(DASHBOARD_PATH).authenticated()).await?;
        Ok(payload.into_value())
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch_json(ApiRequest::get(ME_PATH).authenticated()).await
    }

    /// Revoke the session server-side and drop the stored token. The token is
    /// dropped even when the call fails; an already-expired session counts as
    /// logged out.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.fetch(ApiRequest::post(LOGOUT_PATH).authenticated()).await;
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "failed to clear credential on logout");
        }
        match result {
            Ok(_) | Err(ApiError::AuthRedirect) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("login_route", &self.login_route)
            .finish_non_exhaustive()
    }
}
