use std::env;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling configuration from the environment
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Pool acquire timeout, in seconds
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Allowed CORS origins; a `*.` host segment matches any subdomain
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_request_size_bytes: 1024 * 1024,
        }
    }
}

/// Secrets and validation rules for inbound credentials.
///
/// Built once at startup and handed to the identity verifier; nothing reads
/// these values from the environment after that.
#[derive(Clone, PartialEq)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub service_key: Option<String>,
    pub algorithm: Algorithm,
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            service_key: None,
            algorithm: Algorithm::HS256,
            audience: None,
            leeway_secs: 60,
        }
    }

    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("SUPABASE_JWT_SECRET").ok_or(ConfigError::Missing("SUPABASE_JWT_SECRET"))?;
        let mut auth = Self::with_secret(jwt_secret);
        auth.service_key = get("SUPABASE_SERVICE_KEY");
        auth.audience = get("JWT_AUDIENCE");

        if let Some(v) = get("JWT_ALGORITHM") {
            auth.algorithm = parse_symmetric_algorithm(&v)?;
        }
        if let Some(v) = get("JWT_LEEWAY_SECS") {
            auth.leeway_secs = parse_value("JWT_LEEWAY_SECS", &v)?;
        }

        Ok(auth)
    }
}

// Secrets never reach logs through `{:?}`
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// The environment preset (`APP_ENV`) supplies defaults; specific
    /// variables override them. Unparseable overrides are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let auth = AuthConfig::from_lookup(&lookup)?;
        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut config = match environment {
            Environment::Production => Self::production(url, auth),
            Environment::Staging => Self::staging(url, auth),
            Environment::Development => Self::development(url, auth),
        };

        // PORT wins over SERVER_PORT so hosted platforms can inject it
        if let Some(v) = get("PORT") {
            config.server.port = parse_value("PORT", &v)?;
        } else if let Some(v) = get("SERVER_PORT") {
            config.server.port = parse_value("SERVER_PORT", &v)?;
        }

        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            config.database.connection_timeout = parse_value("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = get("DATABASE_RUN_MIGRATIONS") {
            config.database.run_migrations = parse_value("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        if let Some(v) = get("SECURITY_CORS_ORIGINS") {
            config.api.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = get("API_MAX_REQUEST_SIZE_BYTES") {
            config.api.max_request_size_bytes = parse_value("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        Ok(config)
    }

    fn development(url: String, auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: false,
            },
            api: ApiConfig::default(),
            auth,
        }
    }

    fn staging(url: String, auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: false,
            },
            api: ApiConfig {
                cors_origins: vec![
                    "https://*.vercel.app".to_string(),
                    "http://localhost:3000".to_string(),
                ],
                max_request_size_bytes: 512 * 1024,
            },
            auth,
        }
    }

    fn production(url: String, auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                cors_origins: vec!["https://*.vercel.app".to_string()],
                max_request_size_bytes: 256 * 1024,
            },
            auth,
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_symmetric_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: "JWT_ALGORITHM",
        reason: e.to_string(),
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            reason: format!("{:?} is not a symmetric algorithm", other),
        }),
    }
}
