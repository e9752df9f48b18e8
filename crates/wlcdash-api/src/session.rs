// Authenticated dashboard session
//
// Owns one HTTP client bound to one controller. Every outbound call is
// recorded as an immutable `Request` snapshot so it can be replayed exactly,
// and a 401 on an established session is surfaced as `SessionExpired`.
// The login handshake lives here as well: the dashboard issues its Basic
// challenge lazily on first contact, so login is "probe, then replay".

use std::sync::{PoisonError, RwLock};

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::endpoints;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::validate;

// ── Credentials ─────────────────────────────────────────────────────

/// Username and secret for the controller's web interface.
///
/// Any pair of text values is accepted; the secret is only exposed when
/// the Basic authorization header is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    secret: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: SecretString) -> Self {
        Self {
            username: username.into(),
            secret,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

// ── Request snapshot ────────────────────────────────────────────────

/// An outbound call: method, path relative to the base address, and query.
///
/// Returned inside every [`Response`] so callers can replay exactly what
/// was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Append a query parameter. Order is preserved on the wire.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.query
    }
}

// ── Response ────────────────────────────────────────────────────────

/// A fully-read controller response, paired with the request that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    request: Request,
    url: Url,
    status: StatusCode,
    body: Bytes,
}

impl Response {
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Fail with `UnexpectedStatus` unless the status is in `expect`.
    pub fn expect_status(&self, expect: &[StatusCode]) -> Result<&Self, Error> {
        validate::response_status(self, expect)?;
        Ok(self)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::deserialization(e, &self.text()))
    }
}

// ── Session state ───────────────────────────────────────────────────

/// Authentication state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

// ── Session ─────────────────────────────────────────────────────────

/// One authenticated connection to one controller.
///
/// Shared behind an `Arc` by the controller facade and every entity built
/// from it. Entities issue requests through it but never touch its
/// authentication state.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    /// `None` when the client was supplied by the caller.
    verify_tls: Option<bool>,
    auto_login: bool,
    state: watch::Sender<SessionState>,
    last_request: RwLock<Option<Request>>,
    last_response: RwLock<Option<Response>>,
    /// Serializes login handshakes so concurrent callers don't interleave
    /// the probe and the replay.
    login_lock: Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.credentials.username())
            .field("verify_tls", &self.verify_tls)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session for the controller at `base_url`.
    ///
    /// `base_url` must carry an http(s) scheme and no trailing slash. A
    /// cookie jar is added to the transport if it has none.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = validate::base_url(base_url)?;
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::from_parts(
            http,
            base_url,
            credentials,
            Some(config.tls.verifies()),
        ))
    }

    /// Create a session around a pre-built `reqwest::Client`.
    ///
    /// The client's TLS policy is opaque, so [`verifies_tls`](Self::verifies_tls)
    /// reports `None`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let base_url = validate::base_url(base_url)?;
        Ok(Self::from_parts(http, base_url, credentials, None))
    }

    fn from_parts(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
        verify_tls: Option<bool>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            http,
            base_url,
            credentials,
            verify_tls,
            auto_login: true,
            state,
            last_request: RwLock::new(None),
            last_response: RwLock::new(None),
            login_lock: Mutex::new(()),
        }
    }

    /// Enable or disable logging in on demand before data calls.
    pub fn with_auto_login(mut self, enabled: bool) -> Self {
        self.auto_login = enabled;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Whether the transport verifies certificates, when known.
    pub fn verifies_tls(&self) -> Option<bool> {
        self.verify_tls
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Subscribe to authentication state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The most recently dispatched request, if any.
    pub fn last_request(&self) -> Option<Request> {
        self.last_request
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recently received response, if any.
    pub fn last_response(&self) -> Option<Response> {
        self.last_response
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the authenticated state. The next data call logs in again.
    pub fn reset(&self) {
        self.set_state(SessionState::Unauthenticated);
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            trace!(?previous, ?state, "session state changed");
        }
    }

    // ── Raw requests ─────────────────────────────────────────────────

    /// Build the absolute URL for a path relative to the base address.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        if path.is_empty() || path.starts_with('/') || path.contains("://") {
            return Err(Error::validation(format!(
                "request path '{path}' must be relative to the base address"
            )));
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Dispatch a request and read the full response.
    ///
    /// The request is recorded as the last request before it is sent. A
    /// 401 while authenticated clears the state and returns
    /// `SessionExpired`; a 401 while not authenticated is returned as a
    /// normal response.
    pub async fn request(&self, request: Request) -> Result<Response, Error> {
        let url = self.url_for(request.path())?;
        *self
            .last_request
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        debug!(method = %request.method(), path = request.path(), "dispatching request");

        let resp = self
            .http
            .request(request.method().clone(), url)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.secret().expose_secret()),
            )
            .query(request.params())
            .send()
            .await?;

        let status = resp.status();
        let url = resp.url().clone();
        let body = resp.bytes().await?;
        trace!(%status, bytes = body.len(), "response received");

        let response = Response {
            request,
            url,
            status,
            body,
        };
        *self
            .last_response
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(response.clone());

        if status == StatusCode::UNAUTHORIZED && self.is_authenticated() {
            self.set_state(SessionState::Unauthenticated);
            warn!(path = response.request().path(), "session authentication has timed out");
            return Err(Error::session_expired(
                "session authentication has timed out; log in again and retry",
            ));
        }

        Ok(response)
    }

    /// Reissue the most recently dispatched request unchanged.
    pub async fn retry_last(&self) -> Result<Response, Error> {
        let last = self.last_request().ok_or_else(Error::no_previous_request)?;
        debug!(path = last.path(), "retrying last request");
        self.request(last).await
    }

    // ── Login ────────────────────────────────────────────────────────

    /// Authenticate with the controller.
    ///
    /// Probes the dashboard page (200 or 401 accepted), then replays the
    /// identical request, which must return 200. Only then is the session
    /// marked authenticated. Safe to call repeatedly.
    pub async fn login(&self) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        self.set_state(SessionState::Authenticating);

        match self.handshake().await {
            Ok(()) => {
                self.set_state(SessionState::Authenticated);
                info!(controller = %self.base_url, "authenticated with controller");
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    async fn handshake(&self) -> Result<(), Error> {
        let probe = self.request(Request::get(endpoints::DASHBOARD)).await?;
        if !matches!(probe.status(), StatusCode::OK | StatusCode::UNAUTHORIZED) {
            return Err(Error::login_failed(format!(
                "unexpected status {} when initiating authentication",
                probe.status()
            ))
            .with_hint("the address may not point at a controller's web interface"));
        }
        debug!(status = %probe.status(), "authentication challenge received");

        let confirm = self.request(probe.request().clone()).await?;
        match confirm.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(Error::login_failed(
                "controller rejected the supplied credentials",
            )),
            other => Err(Error::login_failed(format!(
                "unexpected status {other} when completing authentication"
            ))),
        }
    }

    /// Log in if needed before a data call.
    pub async fn ensure_authenticated(&self) -> Result<(), Error> {
        if self.is_authenticated() {
            return Ok(());
        }
        if !self.auto_login {
            return Err(Error::not_logged_in());
        }
        self.login().await?;
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::login_failed(
                "unable to call authenticated function: automatic logon failed",
            ))
        }
    }

    // ── Authenticated data calls ─────────────────────────────────────

    /// Issue an authenticated request that must return 200.
    ///
    /// On `SessionExpired` the session logs in again and replays the same
    /// request exactly once. A second expiry is returned to the caller.
    pub async fn fetch(&self, request: Request) -> Result<Response, Error> {
        self.ensure_authenticated().await?;

        let response = match self.request(request.clone()).await {
            Err(e) if e.is_session_expired() => {
                warn!(path = request.path(), "re-authenticating and replaying request");
                self.login().await?;
                self.request(request).await.map_err(|e| {
                    if e.is_session_expired() {
                        Error::session_expired(
                            "request rejected again after re-authentication",
                        )
                        .with_hint("the account may lack access to this page")
                    } else {
                        e
                    }
                })?
            }
            other => other?,
        };

        response.expect_status(&[StatusCode::OK])?;
        Ok(response)
    }

    /// [`fetch`](Self::fetch) and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        self.fetch(request).await?.json()
    }
}
