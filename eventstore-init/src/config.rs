//! Bootstrap configuration.
//!
//! Loads from environment variables with sensible defaults.

use crate::error::{InitError, InitResult};
use std::env;

/// Environment the bootstrap is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment.
    Test,
    /// Development environment.
    Development,
    /// Production environment.
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Bootstrap configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Running environment.
    pub environment: Environment,
}

impl Config {
    /// Load configuration from environment variables, reading a `.env`
    /// file first if one is present.
    pub fn from_env() -> InitResult<Self> {
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| InitError::Config("DATABASE_URL must be set".to_string()))?;

        let environment = match env::var("EVENTSTORE_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "test" => Environment::Test,
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            other => {
                return Err(InitError::Config(format!(
                    "invalid EVENTSTORE_ENV: {other}. expected: test, development, production"
                )))
            }
        };

        Ok(Self {
            database_url,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_display_matches_env_var_spelling() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
