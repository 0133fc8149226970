use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Base URL used when `PROPERTIES_API_URL` is unset (Docker Desktop host alias).
pub const DEFAULT_PROVIDER_URL: &str = "http://host.docker.internal:8003";

const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BULK_TIMEOUT_SECS: u64 = 120;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub provider: ProviderConfig,
    pub rentals: RentalsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let provider = ProviderConfig {
            base_url: env::var("PROPERTIES_API_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| normalize_base_url(&value))
                .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
            lookup_timeout: timeout_from_env(
                "PROPERTIES_API_TIMEOUT_SECS",
                DEFAULT_LOOKUP_TIMEOUT_SECS,
            )?,
            bulk_timeout: timeout_from_env(
                "PROPERTIES_API_BULK_TIMEOUT_SECS",
                DEFAULT_BULK_TIMEOUT_SECS,
            )?,
        };

        let rentals = RentalsConfig {
            source: env::var("RENTALS_FILE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            provider,
            rentals,
        })
    }
}

fn timeout_from_env(key: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidTimeout { key }),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the external listings provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Applied to query and address-search calls.
    pub lookup_timeout: Duration,
    /// Applied to the bulk snapshot relay, which stays open while the client downloads.
    pub bulk_timeout: Duration,
}

impl ProviderConfig {
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            ..Self::default()
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            bulk_timeout: Duration::from_secs(DEFAULT_BULK_TIMEOUT_SECS),
        }
    }
}

/// Where the curated rental list is read from.
#[derive(Debug, Clone, Default)]
pub struct RentalsConfig {
    pub source: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout { key } => {
                write!(f, "{key} must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "PROPERTIES_API_URL",
            "PROPERTIES_API_TIMEOUT_SECS",
            "PROPERTIES_API_BULK_TIMEOUT_SECS",
            "RENTALS_FILE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_URL);
        assert!(config.rentals.source.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn provider_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PROPERTIES_API_URL", "https://listings.internal:9000/");
        env::set_var("PROPERTIES_API_TIMEOUT_SECS", "5");
        env::set_var("PROPERTIES_API_BULK_TIMEOUT_SECS", "600");
        env::set_var("RENTALS_FILE", "/srv/rentals.json");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.provider.base_url, "https://listings.internal:9000");
        assert_eq!(config.provider.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.provider.bulk_timeout, Duration::from_secs(600));
        assert_eq!(
            config.rentals.source.as_deref(),
            Some(std::path::Path::new("/srv/rentals.json"))
        );
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PROPERTIES_API_TIMEOUT_SECS", "0");
        let error = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidTimeout {
                key: "PROPERTIES_API_TIMEOUT_SECS"
            }
        ));
        reset_env();
    }
}
