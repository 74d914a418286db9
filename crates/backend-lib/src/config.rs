// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::PasswordRequirements;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fintrack.toml";

/// Prefix for environment overrides, e.g. `FINTRACK_SESSION__IDLE_TTL_SECS`
pub const ENV_PREFIX: &str = "FINTRACK_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output length of stored scrypt hashes
const HASH_OUTPUT_LEN: usize = 32;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path (flat-file storage)
    pub data_dir: PathBuf,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Deployment mode
    pub environment: Environment,
    /// Storage backend
    pub storage: StorageBackend,
    /// Session lifetime and cookie settings
    pub session: SessionSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// Password hashing cost
    pub hash: HashSettings,
    /// Request rate limiting
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    FlatFile,
}

/// Session lifetime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Hard cap on a session's age
    pub absolute_ttl_secs: u64,
    /// Inactivity window after which a session expires
    pub idle_ttl_secs: u64,
    /// Mark the session cookie `Secure`. Always on in production.
    pub cookie_secure: bool,
}

/// scrypt cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

/// Fixed-window rate limit applied to every request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_secs: u64,
    /// Key clients by `x-real-ip` / `x-forwarded-for`. Only safe behind a
    /// proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            environment: Environment::Development,
            storage: StorageBackend::FlatFile,
            session: SessionSettings::default(),
            password_requirements: PasswordRequirements::default(),
            hash: HashSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            absolute_ttl_secs: 60 * 60 * 24 * 7, // 7 days
            idle_ttl_secs: 60 * 60 * 2,
            cookie_secure: false,
        }
    }
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
            trust_proxy_headers: false,
        }
    }
}

impl HashSettings {
    /// scrypt parameters for newly hashed secrets
    pub fn params(&self) -> Result<scrypt::Params> {
        scrypt::Params::new(self.log_n, self.r, self.p, HASH_OUTPUT_LEN)
            .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))
    }
}

impl SessionSettings {
    pub fn absolute_ttl(&self) -> Duration {
        Duration::from_secs(self.absolute_ttl_secs)
    }

    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

impl Settings {
    /// Load settings from `fintrack.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from a specific TOML file, then the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run safely with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()),
            "unknown log level {:?}",
            self.log_level
        );
        ensure!(
            self.session.absolute_ttl_secs > 0 && self.session.idle_ttl_secs > 0,
            "session TTLs must be positive"
        );
        ensure!(
            self.session.idle_ttl_secs <= self.session.absolute_ttl_secs,
            "idle TTL cannot exceed the absolute TTL"
        );
        ensure!(
            self.password_requirements.min_length >= 4,
            "minimum password length must be at least 4"
        );
        ensure!(
            self.password_requirements.max_length >= self.password_requirements.min_length,
            "maximum password length is below the minimum"
        );
        ensure!(
            self.rate_limit.max_requests > 0 && self.rate_limit.window_secs > 0,
            "rate limit budget must be positive"
        );
        self.hash.params()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Whether the session cookie carries the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.session.cookie_secure || self.is_production()
    }
}
