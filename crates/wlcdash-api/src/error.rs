use std::fmt;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of failure categories for the `wlcdash-api` crate.
///
/// Callers branch on the kind, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    // ── Validation ──────────────────────────────────────────────────
    /// Malformed constructor or parameter input.
    Validation,

    // ── Session ─────────────────────────────────────────────────────
    /// A data call was made before logging in and auto-login is disabled.
    NotLoggedIn,
    /// Credentials were rejected or the login handshake did not look as expected.
    LoginFailed,
    /// An established session lost its authentication. Re-login and replay.
    SessionExpired,
    /// `retry_last` was called before any request was issued.
    NoPreviousRequest,

    // ── Request ─────────────────────────────────────────────────────
    /// The controller answered with a status outside the accepted set.
    UnexpectedStatus,
    /// Connection, TLS or timeout failure below HTTP.
    Transport,
    /// The body could not be decoded into the expected shape.
    Deserialization,

    // ── Normalization ───────────────────────────────────────────────
    /// A filtered query came back without any data collection.
    NoResults,
    /// A filter that must match exactly once matched zero or several times.
    AmbiguousMatch,
    /// A field required by the caller is absent from the normalized mapping.
    MissingField,
    /// A field is present but its value cannot be read as the requested type.
    InvalidField,

    // ── Model ───────────────────────────────────────────────────────
    /// The requested station is not associated to the controller.
    ClientNotPresent,
}

/// Error type for every fallible operation in `wlcdash-api` and `wlcdash-core`.
///
/// Carries a [`ErrorKind`], a human-readable message, an optional
/// remediation hint, and the underlying cause when there is one.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    hint: Option<String>,
    status: Option<u16>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
            status: None,
            source: None,
        }
    }

    /// Attach a remediation hint shown alongside the message.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    // ── Constructors ────────────────────────────────────────────────

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_logged_in() -> Self {
        Self::new(
            ErrorKind::NotLoggedIn,
            "no authenticated session; a login attempt has yet to be made",
        )
        .with_hint("call login() first or enable automatic login")
    }

    pub fn login_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LoginFailed, message)
            .with_hint("verify the username and password for the controller's web interface")
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpired, message)
            .with_hint("log in again and replay the request")
    }

    pub fn no_previous_request() -> Self {
        Self::new(ErrorKind::NoPreviousRequest, "no previous request to retry")
            .with_hint("make a request first")
    }

    pub fn unexpected_status(
        method: &reqwest::Method,
        url: &url::Url,
        status: reqwest::StatusCode,
        expected: &[reqwest::StatusCode],
    ) -> Self {
        let expected = expected
            .iter()
            .map(|s| s.as_u16().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut err = Self::new(
            ErrorKind::UnexpectedStatus,
            format!("{method} '{url}' returned status {status}, expected one of [{expected}]"),
        );
        err.status = Some(status.as_u16());
        err
    }

    pub fn no_results(what: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NoResults, format!("{what} query returned no results"))
    }

    pub fn ambiguous_match(what: impl fmt::Display, count: usize) -> Self {
        Self::new(
            ErrorKind::AmbiguousMatch,
            format!("expected exactly one {what}, but got {count}"),
        )
    }

    pub fn missing_field(field: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::MissingField,
            format!("required field '{field}' missing from response"),
        )
    }

    pub fn invalid_field(field: impl fmt::Display, raw: &str, expected: &str) -> Self {
        Self::new(
            ErrorKind::InvalidField,
            format!("field '{field}' has value {raw:?}, expected {expected}"),
        )
    }

    pub fn client_not_present(mac: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ClientNotPresent,
            format!("client {mac} is not associated to the controller"),
        )
    }

    pub fn deserialization(source: serde_json::Error, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::new(
            ErrorKind::Deserialization,
            format!("{source} (body preview: {preview:?})"),
        )
        .with_source(source)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// HTTP status for [`ErrorKind::UnexpectedStatus`] errors.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    // ── Classification ──────────────────────────────────────────────

    /// Returns `true` if a fresh login followed by a replay may succeed.
    pub fn is_session_expired(&self) -> bool {
        self.kind == ErrorKind::SessionExpired
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    /// Returns `true` for failures raised while turning a response into fields.
    pub fn is_normalization(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NoResults
                | ErrorKind::AmbiguousMatch
                | ErrorKind::MissingField
                | ErrorKind::InvalidField
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        if self.kind != ErrorKind::Transport {
            return false;
        }
        self.source
            .as_ref()
            .and_then(|s| s.downcast_ref::<reqwest::Error>())
            .is_some_and(|e| e.is_timeout() || e.is_connect())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_owned()
        } else if err.is_connect() {
            format!("cannot connect to controller: {err}")
        } else {
            format!("HTTP transport error: {err}")
        };
        Self::new(ErrorKind::Transport, message).with_source(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::validation(format!("invalid URL: {err}")).with_source(err)
    }
}
