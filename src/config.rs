/*
 * Responsibility
 * - Environment/configuration loading (DATABASE_URL, JWT secret, auth header
 *   convention, session store backend, CORS allowlist)
 * - Validation of settings (missing/invalid values fail startup)
 * - Settings are read once at startup and never mutated afterwards
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which backend holds the per-user session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Valkey,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,

    // Shared HS256 secret; this process owns both signing and verification.
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    // Header convention: `<name>: [<type> ]<token>`. An empty type means the
    // header value is the bare token.
    pub auth_header_name: String,
    pub auth_header_type: Option<String>,

    pub session_store: SessionBackend,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let access_token_ttl_seconds = std::env::var("ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let auth_header_name =
            std::env::var("AUTH_HEADER_NAME").unwrap_or_else(|_| "Authorization".to_string());
        if auth_header_name.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_HEADER_NAME"));
        }

        // Explicitly setting AUTH_HEADER_TYPE to "" selects the bare-token shape.
        let auth_header_type = match std::env::var("AUTH_HEADER_TYPE") {
            Ok(s) => {
                let s = s.trim().to_string();
                if s.is_empty() { None } else { Some(s) }
            }
            Err(_) => Some("Bearer".to_string()),
        };

        let session_store = match std::env::var("SESSION_STORE")
            .unwrap_or_else(|_| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => SessionBackend::Memory,
            "valkey" | "redis" => SessionBackend::Valkey,
            _ => return Err(ConfigError::Invalid("SESSION_STORE")),
        };

        let redis_url = std::env::var("REDIS_URL").ok();
        if session_store == SessionBackend::Valkey && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            request_timeout_seconds,
            jwt_secret,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            auth_header_name,
            auth_header_type,
            session_store,
            redis_url,
            session_ttl_seconds,
        })
    }
}
