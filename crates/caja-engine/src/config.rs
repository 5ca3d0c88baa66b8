//! Engine configuration.
//!
//! Loaded from environment variables with fallback to defaults, so hosts can
//! run the engine unconfigured in development and fully pinned in production.

use std::env;

use caja_db::DbConfig;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// SQLite database file path.
    pub database_path: String,

    /// Maximum pool connections.
    pub max_connections: u32,

    /// Whether to run migrations on startup.
    pub run_migrations: bool,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable              | Default       |
    /// |-----------------------|---------------|
    /// | `CAJA_DATABASE_PATH`  | `./caja.db`   |
    /// | `CAJA_MAX_CONNECTIONS`| `5`           |
    /// | `CAJA_RUN_MIGRATIONS` | `true`        |
    pub fn load() -> Result<Self, ConfigError> {
        let config = EngineConfig {
            database_path: env::var("CAJA_DATABASE_PATH")
                .unwrap_or_else(|_| "./caja.db".to_string()),

            max_connections: env::var("CAJA_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CAJA_MAX_CONNECTIONS".to_string()))?,

            run_migrations: env::var("CAJA_RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CAJA_RUN_MIGRATIONS".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CAJA_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database configuration derived from this engine configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: "./caja.db".to_string(),
            max_connections: 5,
            run_migrations: true,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
