use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::standing::{RegistrationNormalizer, StandingThresholds};

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
    pub standing: StandingConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            standing: StandingConfig::from_env()?,
        })
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Data source and rule thresholds for standing evaluation.
#[derive(Debug, Clone, Default)]
pub struct StandingConfig {
    /// Directory holding the registrar CSV exports; the bundled sample cohort is used
    /// when unset.
    pub data_dir: Option<PathBuf>,
    pub summer_year_offset: u16,
    pub thresholds: StandingThresholds,
}

impl StandingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("STANDING_DATA_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let summer_year_offset = match env::var("STANDING_SUMMER_YEAR_OFFSET") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidSummerYearOffset(value))?,
            Err(_) => 0,
        };

        let defaults = StandingThresholds::default();
        let thresholds = StandingThresholds {
            probation_gpax: gpax_var("STANDING_PROBATION_GPAX", defaults.probation_gpax)?,
            critical_gpax: gpax_var("STANDING_CRITICAL_GPAX", defaults.critical_gpax)?,
        };
        if thresholds.critical_gpax > thresholds.probation_gpax {
            return Err(ConfigError::ThresholdOrder {
                probation: thresholds.probation_gpax,
                critical: thresholds.critical_gpax,
            });
        }

        Ok(Self {
            data_dir,
            summer_year_offset,
            thresholds,
        })
    }

    pub fn normalizer(&self) -> RegistrationNormalizer {
        RegistrationNormalizer::new(self.summer_year_offset)
    }
}

fn gpax_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(default);
    };
    match value.trim().parse::<f64>() {
        Ok(parsed) if (0.0..=4.0).contains(&parsed) => Ok(parsed),
        _ => Err(ConfigError::InvalidThreshold { name, value }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSummerYearOffset(String),
    InvalidThreshold { name: &'static str, value: String },
    ThresholdOrder { probation: f64, critical: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSummerYearOffset(value) => write!(
                f,
                "STANDING_SUMMER_YEAR_OFFSET must be a non-negative integer, got '{}'",
                value
            ),
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "{} must be a GPAX between 0 and 4, got '{}'", name, value)
            }
            ConfigError::ThresholdOrder {
                probation,
                critical,
            } => write!(
                f,
                "critical GPAX {} must not exceed probation GPAX {}",
                critical, probation
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSummerYearOffset(_)
            | ConfigError::InvalidThreshold { .. }
            | ConfigError::ThresholdOrder { .. } => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("STANDING_DATA_DIR");
        env::remove_var("STANDING_SUMMER_YEAR_OFFSET");
        env::remove_var("STANDING_PROBATION_GPAX");
        env::remove_var("STANDING_CRITICAL_GPAX");
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
        assert_eq!(config.standing.data_dir, None);
        assert_eq!(config.standing.summer_year_offset, 0);
        assert_eq!(config.standing.thresholds, StandingThresholds::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_standing_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDING_DATA_DIR", "/srv/registrar/export");
        env::set_var("STANDING_SUMMER_YEAR_OFFSET", "2");
        env::set_var("STANDING_PROBATION_GPAX", "2.0");
        env::set_var("STANDING_CRITICAL_GPAX", "1.25");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.standing.data_dir,
            Some(PathBuf::from("/srv/registrar/export"))
        );
        assert_eq!(config.standing.normalizer().summer_year_offset(), 2);
        assert_eq!(config.standing.thresholds.probation_gpax, 2.0);
        assert_eq!(config.standing.thresholds.critical_gpax, 1.25);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDING_PROBATION_GPAX", "4.5");
        let err = AppConfig::load().expect_err("threshold above 4 rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold {
                name: "STANDING_PROBATION_GPAX",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDING_PROBATION_GPAX", "1.5");
        env::set_var("STANDING_CRITICAL_GPAX", "1.75");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
        reset_env();
    }

    #[test]
    fn rejects_negative_summer_offset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDING_SUMMER_YEAR_OFFSET", "-2");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidSummerYearOffset(_))
        ));
        reset_env();
    }
}
