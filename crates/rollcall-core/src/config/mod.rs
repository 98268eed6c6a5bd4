//! Application configuration schemas.
//!
//! Sources are merged in order: `config/default.toml`, `config/{env}.toml`,
//! then `ROLLCALL__SECTION__KEY` environment variables.

pub mod app;
pub mod attendance;
pub mod auth;
pub mod biometric;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::attendance::AttendanceConfig;
pub use self::auth::AuthConfig;
pub use self::biometric::BiometricConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Token settings.
    pub auth: AuthConfig,
    /// Face verification service settings.
    #[serde(default)]
    pub biometric: BiometricConfig,
    /// Attendance endpoint settings.
    #[serde(default)]
    pub attendance: AttendanceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ROLLCALL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Parse a configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the token authority cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.access_token_secret.is_empty() || self.auth.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token secrets must not be empty"));
        }
        if self.auth.access_token_secret == self.auth.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh tokens must use different secrets",
            ));
        }
        if self.auth.access_token_ttl_minutes == 0 || self.auth.refresh_token_ttl_days == 0 {
            return Err(AppError::configuration("Token TTLs must be positive"));
        }
        Ok(())
    }
}
