// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, JWT settings, refill cadence, and CORS from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Environment-based configuration management for production deployment

use crate::constants::{auth, database, ports, refill};
use anyhow::{anyhow, Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for `PostgreSQL` URLs and for empty strings
    pub fn parse_url(s: &str) -> Result<Self> {
        if s.starts_with("postgresql://") || s.starts_with("postgres://") {
            return Err(anyhow!(
                "PostgreSQL database URLs are not supported; use sqlite:<path>"
            ));
        }

        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str.is_empty() {
            return Err(anyhow!("DATABASE_URL is empty"));
        }
        if path_str == ":memory:" {
            return Ok(Self::Memory);
        }

        Ok(Self::SQLite {
            path: PathBuf::from(path_str),
        })
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                database::DEFAULT_DATABASE_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(database::DEFAULT_DATABASE_URL),
            ),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Storage settings
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// JWT and password hashing settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Whether the secret was generated for this process only
    pub jwt_secret_generated: bool,
    /// JWT lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Settings with a random per-process secret
    #[must_use]
    pub fn with_generated_secret() -> Self {
        Self {
            jwt_secret: generate_secret(),
            jwt_secret_generated: true,
            jwt_expiry_hours: auth::DEFAULT_JWT_EXPIRY_HOURS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::with_generated_secret()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_secret_generated", &self.jwt_secret_generated)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Replenishment scheduler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefillConfig {
    /// Whether the server runs the scheduler at all
    pub enabled: bool,
    /// Time between runs
    pub interval: Duration,
    /// Skip companies whose policy cooldown has not elapsed since their last refill
    pub honor_policy_cooldown: bool,
}

impl Default for RefillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(refill::DEFAULT_INTERVAL_SECS),
            honor_policy_cooldown: false,
        }
    }
}

/// Cross-origin settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Storage settings
    pub database: DatabaseConfig,
    /// JWT and hashing settings
    pub auth: AuthConfig,
    /// Scheduler settings
    pub refill: RefillConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: ports::DEFAULT_HOST.to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            environment: Environment::default(),
            log_level: LogLevel::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            refill: RefillConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let auth = match env::var("JWT_SECRET_KEY") {
            Ok(secret) if !secret.trim().is_empty() => AuthConfig {
                jwt_secret: secret,
                jwt_secret_generated: false,
                ..AuthConfig::with_generated_secret()
            },
            _ => {
                warn!("JWT_SECRET_KEY not set; generated a per-process secret, sessions will not survive a restart");
                AuthConfig::with_generated_secret()
            }
        };

        let interval_secs: u64 = env_var_or(
            "REFILL_INTERVAL_SECS",
            &refill::DEFAULT_INTERVAL_SECS.to_string(),
        )?
        .parse()
        .context("Invalid REFILL_INTERVAL_SECS value")?;
        if interval_secs == 0 {
            return Err(anyhow!("REFILL_INTERVAL_SECS must be greater than zero"));
        }

        let config = Self {
            host: env_var_or("HOST", ports::DEFAULT_HOST)?,
            http_port: env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())?
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )?),
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")?),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or(
                    "DATABASE_URL",
                    database::DEFAULT_DATABASE_URL,
                )?)
                .context("Invalid DATABASE_URL value")?,
            },
            auth: AuthConfig {
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &auth::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
                )?
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
                bcrypt_cost: env_var_or("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?
                    .parse()
                    .context("Invalid BCRYPT_COST value")?,
                ..auth
            },
            refill: RefillConfig {
                enabled: env_var_or("REFILL_ENABLED", "true")?
                    .parse()
                    .context("Invalid REFILL_ENABLED value")?,
                interval: Duration::from_secs(interval_secs),
                honor_policy_cooldown: env_var_or("REFILL_HONOR_POLICY_COOLDOWN", "false")?
                    .parse()
                    .context("Invalid REFILL_HONOR_POLICY_COOLDOWN value")?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")?),
            },
        };

        Ok(config)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Leaky Bucket Server Configuration:\n\
             - Bind: {}:{}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - JWT Expiry: {}h\n\
             - Refill Scheduler: {}\n\
             - Refill Interval: {}s\n\
             - Per-Policy Cooldown: {}\n\
             - CORS Origins: {}",
            self.host,
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            if self.auth.jwt_secret_generated {
                "Generated (ephemeral)"
            } else {
                "Configured"
            },
            self.auth.jwt_expiry_hours,
            if self.refill.enabled {
                "Enabled"
            } else {
                "Disabled"
            },
            self.refill.interval.as_secs(),
            if self.refill.honor_policy_cooldown {
                "Honored"
            } else {
                "Ignored"
            },
            self.cors.allowed_origins.join(", "),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_owned()))
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(auth::GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}
