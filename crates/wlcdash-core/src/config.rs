// ── Runtime connection configuration ──
//
// These types describe *how* to talk to one controller dashboard.
// They carry credential data and connection tuning, but never touch disk.
// The CLI builds a `ControllerConfig` and hands it to `Controller::new`.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use wlcdash_api::transport::{TlsMode, TransportConfig};

/// Login for the controller's web interface.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Controllers ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Dashboard base address, e.g. `https://10.0.0.2`. No trailing slash.
    pub url: String,
    pub credentials: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Freshness window for memoized entity groups.
    pub cache_ttl: Duration,
    /// Log in on demand before data calls.
    pub auto_login: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: "https://192.168.1.2".into(),
            credentials: AuthCredentials {
                username: "admin".into(),
                password: SecretString::from(String::new()),
            },
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(60),
            auto_login: true,
        }
    }
}

impl ControllerConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_tls(TlsMode::from(&self.tls))
            .with_timeout(self.timeout)
            .with_cookie_jar()
    }
}
