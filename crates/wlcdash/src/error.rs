//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use wlcdash_config::ConfigError;
use wlcdash_core::{Error as CoreError, ErrorKind};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(wlcdash::connection_failed),
        help(
            "Check that the dashboard is reachable.\n\
             Controllers ship self-signed certificates; omit --verify-tls or set ca_cert."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(wlcdash::auth_failed),
        help(
            "Verify the web interface username and password.\n\
             Run: wlcdash config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(wlcdash::no_credentials),
        help(
            "Set username in the profile (or pass --username) and provide the password\n\
             with WLCDASH_PASSWORD or: wlcdash config set-password"
        )
    )]
    NoCredentials { profile: String },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wlcdash::not_found),
        help("Run: wlcdash {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Controller ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(wlcdash::controller))]
    Controller {
        kind: ErrorKind,
        message: String,
        #[help]
        hint: Option<String>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wlcdash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wlcdash::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(wlcdash::no_config),
        help(
            "Pass --controller, set WLCDASH_CONTROLLER, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wlcdash::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::Controller { kind, .. } => match kind {
                ErrorKind::NoResults | ErrorKind::AmbiguousMatch | ErrorKind::ClientNotPresent => {
                    exit_code::NOT_FOUND
                }
                ErrorKind::NotLoggedIn | ErrorKind::SessionExpired => exit_code::AUTH,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err.kind() {
            ErrorKind::Transport => Self::ConnectionFailed {
                message: err.to_string(),
            },
            ErrorKind::LoginFailed => Self::AuthFailed {
                message: err.to_string(),
            },
            ErrorKind::Validation => Self::Validation {
                field: "argument".into(),
                reason: err.to_string(),
            },
            kind => Self::Controller {
                kind,
                message: err.to_string(),
                hint: err.hint().map(str::to_owned),
            },
        }
    }
}

/// Map a failed client lookup, naming the MAC the user asked for.
pub fn client_lookup(err: CoreError, mac: &str) -> CliError {
    if err.kind() == ErrorKind::ClientNotPresent {
        CliError::NotFound {
            resource_type: "client".into(),
            identifier: mac.to_owned(),
            list_command: "clients list".into(),
        }
    } else {
        err.into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn library_kinds_map_to_exit_codes() {
        let cases = [
            (CoreError::login_failed("rejected"), exit_code::AUTH),
            (CoreError::not_logged_in(), exit_code::AUTH),
            (CoreError::validation("bad mac"), exit_code::USAGE),
            (CoreError::no_results("application 'x'"), exit_code::NOT_FOUND),
            (CoreError::ambiguous_match("application 'x'", 2), exit_code::NOT_FOUND),
            (CoreError::missing_field("radio.rssi"), exit_code::GENERAL),
        ];
        for (err, code) in cases {
            assert_eq!(CliError::from(err).exit_code(), code);
        }
    }

    #[test]
    fn absent_client_keeps_identifier() {
        let err = client_lookup(
            CoreError::client_not_present("aa:bb:cc:dd:ee:ff"),
            "AA-BB-CC-DD-EE-FF",
        );
        match err {
            CliError::NotFound { identifier, .. } => assert_eq!(identifier, "AA-BB-CC-DD-EE-FF"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_credentials_error_is_auth() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
