/// Configuration management for the CPF verifier
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub verification: VerificationConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Static assets served for unmatched paths
    pub public_directory: PathBuf,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub health_check_interval_secs: u64,
}

/// Remote verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub api_url: String,
    /// Shared bound for the remote call and store operations
    pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_directory: PathBuf::from("./public"),
            },
            storage: StorageConfig {
                database_url: "sqlite://data/cpf.sqlite".to_string(),
                max_connections: 10,
                health_check_interval_secs: 5,
            },
            verification: VerificationConfig {
                api_url: "https://test-nuvem.onrender.com".to_string(),
                timeout_ms: 300_000, // 5 minutes
            },
            logging: LoggingConfig {
                level: "cpf_verifier=debug,tower_http=debug".to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        Ok(ServerConfig {
            service: ServiceConfig {
                host: env::var("HOST").unwrap_or(defaults.service.host),
                port: parse_var("PORT", defaults.service.port)?,
                public_directory: env::var("PUBLIC_DIRECTORY")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.service.public_directory),
            },
            storage: StorageConfig {
                database_url: env::var("DATABASE_URL").unwrap_or(defaults.storage.database_url),
                max_connections: parse_var(
                    "DB_MAX_CONNECTIONS",
                    defaults.storage.max_connections,
                )?,
                health_check_interval_secs: parse_var(
                    "STORE_HEALTH_INTERVAL_SECS",
                    defaults.storage.health_check_interval_secs,
                )?,
            },
            verification: VerificationConfig {
                api_url: env::var("VERIFICATION_API_URL")
                    .unwrap_or(defaults.verification.api_url),
                timeout_ms: parse_var(
                    "VERIFICATION_TIMEOUT_MS",
                    defaults.verification.timeout_ms,
                )?,
            },
            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or(defaults.logging.level),
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.verification.api_url.trim().is_empty() {
            return Err(AppError::Validation(
                "Verification API URL cannot be empty".to_string(),
            ));
        }

        if self.verification.timeout_ms == 0 {
            return Err(AppError::Validation(
                "Verification timeout must be greater than zero".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(AppError::Validation(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        if self.storage.health_check_interval_secs == 0 {
            return Err(AppError::Validation(
                "Store health check interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Bound applied to the remote call and to store operations
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.verification.timeout_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.storage.health_check_interval_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

/// Read `key`, falling back to `default` when unset; a malformed value is an error
fn parse_var<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid value for {}: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
