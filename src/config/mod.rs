use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Accepted range for `SECURITY_TOKEN_TTL_DAYS`.
pub const MIN_TOKEN_TTL_DAYS: i64 = 1;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Full connection URL; takes precedence over the individual components.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Where the session credential is read from on inbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialSource {
    Cookie,
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub credential_source: CredentialSource,
    pub require_activation: bool,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub directory: String,
    pub public_prefix: String,
    pub max_bytes: usize,
}

const DEVELOPMENT_SECRET: &str = "todo-api-development-secret";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_BACKEND") {
            self.database.backend = match v.as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { key: "DATABASE_BACKEND", value: v }),
            };
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("DATABASE_PORT") {
            self.database.port = parse("DATABASE_PORT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_USERNAME") {
            self.database.username = v;
        }
        if let Some(v) = lookup("DATABASE_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Some(v) = lookup("DATABASE_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        match lookup("JWT_SECRET") {
            Some(v) if !v.is_empty() => self.security.jwt_secret = v,
            _ if self.environment != Environment::Development => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            _ => tracing::warn!("JWT_SECRET not set, using the development secret"),
        }
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_DAYS") {
            let days: i64 = parse("SECURITY_TOKEN_TTL_DAYS", &v)?;
            if !(MIN_TOKEN_TTL_DAYS..=MAX_TOKEN_TTL_DAYS).contains(&days) {
                return Err(ConfigError::Invalid { key: "SECURITY_TOKEN_TTL_DAYS", value: v });
            }
            self.security.token_ttl_days = days;
        }
        if let Some(v) = lookup("SECURITY_COOKIE_NAME") {
            self.security.cookie_name = v;
        }
        if let Some(v) = lookup("SECURITY_COOKIE_DOMAIN") {
            self.security.cookie_domain = Some(v).filter(|d| !d.is_empty());
        }
        if let Some(v) = lookup("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = parse("SECURITY_COOKIE_SECURE", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CREDENTIAL_SOURCE") {
            self.security.credential_source = match v.as_str() {
                "cookie" => CredentialSource::Cookie,
                "bearer" => CredentialSource::Bearer,
                _ => return Err(ConfigError::Invalid { key: "SECURITY_CREDENTIAL_SOURCE", value: v }),
            };
        }
        if let Some(v) = lookup("SECURITY_REQUIRE_ACTIVATION") {
            self.security.require_activation = parse("SECURITY_REQUIRE_ACTIVATION", &v)?;
        }
        if let Some(v) = lookup("SECURITY_PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = parse("SECURITY_PASSWORD_MEMORY_KIB", &v)?;
        }
        if let Some(v) = lookup("SECURITY_PASSWORD_ITERATIONS") {
            self.security.password_iterations = parse("SECURITY_PASSWORD_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Upload overrides
        if let Some(v) = lookup("UPLOAD_DIR") {
            self.uploads.directory = v;
        }
        if let Some(v) = lookup("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = parse("UPLOAD_MAX_BYTES", &v)?;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                username: "postgres".to_string(),
                password: None,
                name: "todo".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_SECRET.to_string(),
                token_ttl_days: 30,
                cookie_name: "jwt".to_string(),
                cookie_domain: None,
                cookie_secure: false,
                credential_source: CredentialSource::Cookie,
                require_activation: false,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            uploads: UploadConfig {
                directory: "images".to_string(),
                public_prefix: "/assets/images".to_string(),
                max_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = String::new();
        config.security.cookie_secure = true;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.uploads.max_bytes = 5 * 1024 * 1024; // 5MB
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.jwt_secret = String::new();
        config.security.cookie_secure = true;
        config.security.password_memory_kib = 64 * 1024;
        config.security.password_iterations = 3;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config.uploads.max_bytes = 2 * 1024 * 1024; // 2MB
        config
    }

    /// Cheap configuration for tests: in-memory store, weak password hashing.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.database.backend = StoreBackend::Memory;
        config.security.password_memory_kib = 1024;
        config.security.password_iterations = 1;
        config.security.cors_origins = Vec::new();
        config
    }
}

impl DatabaseConfig {
    /// Postgres connection URL, either the explicit one or built from components.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let base = format!("postgres://{}:{}", self.host, self.port);
        let mut url = url::Url::parse(&base).map_err(|_| ConfigError::Invalid {
            key: "DATABASE_HOST",
            value: self.host.clone(),
        })?;
        url.set_username(&self.username).map_err(|_| ConfigError::Invalid {
            key: "DATABASE_USERNAME",
            value: self.username.clone(),
        })?;
        url.set_password(self.password.as_deref()).map_err(|_| ConfigError::Invalid {
            key: "DATABASE_PASSWORD",
            value: "<redacted>".to_string(),
        })?;
        url.set_path(&format!("/{}", self.name));
        Ok(url.into())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
