use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::auth::AuthPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub validation: ValidationConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
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
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. None selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// When set, student names must start with this letter (case-insensitive)
    pub name_initial: Option<char>,
}

/// How PUT treats fields missing from the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PutPolicy {
    /// Every field is required, exactly like create
    #[default]
    Full,
    /// Missing fields keep their stored value, exactly like PATCH
    Partial,
}

impl PutPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(PutPolicy::Full),
            "partial" => Some(PutPolicy::Partial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub put_policy: PutPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub auth_policy: AuthPolicy,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("STUDENT_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Validation overrides
        if let Ok(v) = env::var("VALIDATION_NAME_INITIAL") {
            self.validation.name_initial = parse_initial(&v);
        }

        // API overrides
        if let Ok(v) = env::var("API_PUT_POLICY") {
            self.api.put_policy = PutPolicy::parse(&v).unwrap_or(self.api.put_policy);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_AUTH_POLICY") {
            self.security.auth_policy = AuthPolicy::parse(&v).unwrap_or(self.security.auth_policy);
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                max_request_size_bytes: 1024 * 1024, // 1MB
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            validation: ValidationConfig::default(),
            api: ApiConfig::default(),
            security: SecurityConfig {
                auth_policy: AuthPolicy::Disabled,
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 256 * 1024,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            validation: ValidationConfig::default(),
            api: ApiConfig::default(),
            security: SecurityConfig {
                auth_policy: AuthPolicy::ReadOnlyAnonymous,
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 64 * 1024,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            validation: ValidationConfig::default(),
            api: ApiConfig::default(),
            security: SecurityConfig {
                auth_policy: AuthPolicy::Required,
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: false,
            },
        }
    }

    /// Configuration suitable for tests: development preset, no env lookups
    pub fn for_tests() -> Self {
        Self::development()
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            Environment::Development => "student_api=debug,tower_http=debug",
            Environment::Staging | Environment::Production => "student_api=info,tower_http=info",
        }
    }
}

/// Single ASCII letter, or None for an empty value
fn parse_initial(value: &str) -> Option<char> {
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

// Global singleton config - initialized once at startup, read by the binaries only
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());
        assert_eq!(config.security.auth_policy, AuthPolicy::Disabled);
        assert_eq!(config.api.put_policy, PutPolicy::Full);
        assert!(config.validation.name_initial.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.security.auth_policy, AuthPolicy::Required);
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.server.enable_request_logging);
    }

    #[test]
    fn parses_put_policy() {
        assert_eq!(PutPolicy::parse("Partial"), Some(PutPolicy::Partial));
        assert_eq!(PutPolicy::parse(" full "), Some(PutPolicy::Full));
        assert_eq!(PutPolicy::parse("merge"), None);
    }

    #[test]
    fn parses_name_initial() {
        assert_eq!(parse_initial("R"), Some('r'));
        assert_eq!(parse_initial(""), None);
        assert_eq!(parse_initial("ra"), None);
        assert_eq!(parse_initial("7"), None);
    }
}
