//! Shared configuration for wlcdash front ends.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `wlcdash_core::ControllerConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wlcdash_core::{AuthCredentials, ControllerConfig, TlsVerification};

/// Environment variable holding the web interface username.
pub const USERNAME_ENV: &str = "WLCDASH_USERNAME";
/// Environment variable holding the web interface password.
pub const PASSWORD_ENV: &str = "WLCDASH_PASSWORD";

const KEYRING_SERVICE: &str = "wlcdash";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub verify_tls: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Cache freshness window in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout: default_timeout(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    60
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard base URL (e.g., "https://10.0.0.2"). No trailing slash.
    pub controller: String,

    /// Web interface username.
    pub username: Option<String>,

    /// Password (plaintext; prefer the keyring or `WLCDASH_PASSWORD`).
    pub password: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override TLS verification.
    pub verify_tls: Option<bool>,

    /// Override request timeout.
    pub timeout: Option<u64>,

    /// Override cache freshness window.
    pub cache_ttl: Option<u64>,

    /// Log in on demand before data calls. Defaults to true.
    pub auto_login: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "wlcdash", "wlcdash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wlcdash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `WLCDASH_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WLCDASH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Profiles ────────────────────────────────────────────────────────

impl Config {
    /// The profile name to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve username + password for a profile.
///
/// Username: profile, then `WLCDASH_USERNAME`.
/// Password: `WLCDASH_PASSWORD`, then the OS keyring, then plaintext.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<AuthCredentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(AuthCredentials {
            username,
            password: SecretString::from(pw),
        });
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(AuthCredentials {
                username,
                password: SecretString::from(pw),
            });
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(AuthCredentials {
            username,
            password: SecretString::from(pw.clone()),
        });
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Build a `ControllerConfig` from a profile and the global defaults.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = profile.controller.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            field: "controller".into(),
            reason: format!("'{url}' must begin with http:// or https://"),
        });
    }
    if url.ends_with('/') {
        return Err(ConfigError::Validation {
            field: "controller".into(),
            reason: format!(
                "'{url}' must not end with a forward-slash; use '{}'",
                url.trim_end_matches('/')
            ),
        });
    }

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.verify_tls.unwrap_or(defaults.verify_tls) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    };

    Ok(ControllerConfig {
        url: url.to_owned(),
        credentials,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        cache_ttl: Duration::from_secs(profile.cache_ttl.unwrap_or(defaults.cache_ttl)),
        auto_login: profile.auto_login.unwrap_or(true),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
        default_profile = "lab"

        [defaults]
        timeout = 15

        [profiles.lab]
        controller = "https://10.0.0.2"
        username = "monitor"
        password = "plain"
        cache_ttl = 5

        [profiles.strict]
        controller = "https://wlc.example.net"
        username = "monitor"
        verify_tls = true
    "#;

    #[test]
    fn loads_profiles_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();

            assert_eq!(cfg.active_profile_name(None), "lab");
            assert_eq!(cfg.active_profile_name(Some("strict")), "strict");
            assert_eq!(cfg.defaults.timeout, 15);
            assert_eq!(cfg.defaults.cache_ttl, 60);
            assert_eq!(cfg.profile("lab").unwrap().cache_ttl, Some(5));
            assert!(matches!(
                cfg.profile("missing"),
                Err(ConfigError::ProfileNotFound { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("WLCDASH_DEFAULTS__TIMEOUT", "7");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.timeout, 7);
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert!(cfg.profiles.is_empty());
            assert_eq!(cfg.defaults.timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn env_password_wins_and_profile_translates() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env(PASSWORD_ENV, "from-env");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            let profile = cfg.profile("lab").unwrap();

            let controller = profile_to_controller_config(profile, "lab", &cfg.defaults).unwrap();
            assert_eq!(controller.url, "https://10.0.0.2");
            assert_eq!(controller.credentials.username, "monitor");
            assert_eq!(controller.credentials.password.expose_secret(), "from-env");
            assert_eq!(controller.timeout, Duration::from_secs(15));
            assert_eq!(controller.cache_ttl, Duration::from_secs(5));
            assert_eq!(controller.tls, TlsVerification::DangerAcceptInvalid);
            assert!(controller.auto_login);

            let strict = cfg.profile("strict").unwrap();
            let controller = profile_to_controller_config(strict, "strict", &cfg.defaults).unwrap();
            assert_eq!(controller.tls, TlsVerification::SystemDefaults);
            Ok(())
        });
    }

    #[test]
    fn missing_username_is_no_credentials() {
        Jail::expect_with(|_jail| {
            let profile = Profile {
                controller: "https://10.0.0.2".into(),
                ..Profile::default()
            };
            let err = resolve_credentials(&profile, "bare").unwrap_err();
            assert!(matches!(err, ConfigError::NoCredentials { .. }));
            Ok(())
        });
    }

    #[test]
    fn trailing_slash_controller_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "pw");
            let profile = Profile {
                controller: "https://10.0.0.2/".into(),
                username: Some("monitor".into()),
                ..Profile::default()
            };
            let err = profile_to_controller_config(&profile, "p", &Defaults::default()).unwrap_err();
            match err {
                ConfigError::Validation { field, reason } => {
                    assert_eq!(field, "controller");
                    assert!(reason.contains("use 'https://10.0.0.2'"), "{reason}");
                }
                other => panic!("unexpected {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn schemeless_controller_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "pw");
            let profile = Profile {
                controller: "10.0.0.2".into(),
                username: Some("monitor".into()),
                ..Profile::default()
            };
            let err = profile_to_controller_config(&profile, "p", &Defaults::default()).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { .. }));
            Ok(())
        });
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                controller: "https://10.0.0.2".into(),
                username: Some("monitor".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.lab]"));
        assert!(written.contains("controller = \"https://10.0.0.2\""));
    }
}
