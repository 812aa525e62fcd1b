/*
 * Responsibility
 * - 環境変数や設定の読み込み (token secret, Valkey URL, cookie 属性など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::session::SessionCookieConfig;

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

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Token codec
    pub auth_token_secret: String,
    // 0 means tokens are issued without an expiry (deliberate escape hatch).
    pub auth_token_ttl_seconds: u64,
    pub auth_token_leeway_seconds: u64,

    // Session store
    pub valkey_url: String,
    pub session_cookie: SessionCookieConfig,

    // Delegated authorization (sudo routes)
    pub delegated_auth_url: String,
    pub delegated_auth_timeout: Duration,
    pub delegated_cookie_name: String,

    // Where anonymous clients are sent to start the external login flow.
    pub external_login_url: String,
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

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_token_secret = std::env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("AUTH_TOKEN_SECRET"))?;

        let auth_token_ttl_seconds = std::env::var("AUTH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400); // 24 h

        let auth_token_leeway_seconds = std::env::var("AUTH_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let valkey_url =
            std::env::var("VALKEY_URL").map_err(|_| ConfigError::Missing("VALKEY_URL"))?;

        let session_cookie = SessionCookieConfig {
            name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "app_session".into()),
            path: std::env::var("SESSION_COOKIE_PATH").unwrap_or_else(|_| "/".into()),
            domain: std::env::var("SESSION_COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            secure: std::env::var("SESSION_COOKIE_SECURE")
                .ok()
                .map(|v| v != "false")
                .unwrap_or(true),
            http_only: true,
        };

        let delegated_auth_url = std::env::var("DELEGATED_AUTH_URL")
            .map_err(|_| ConfigError::Missing("DELEGATED_AUTH_URL"))?;

        let delegated_auth_timeout = Duration::from_secs(
            std::env::var("DELEGATED_AUTH_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        );

        let delegated_cookie_name =
            std::env::var("DELEGATED_COOKIE_NAME").unwrap_or_else(|_| "session".into());

        let external_login_url = std::env::var("EXTERNAL_LOGIN_URL")
            .unwrap_or_else(|_| "https://accounts.example.com/login".into());

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            auth_token_secret,
            auth_token_ttl_seconds,
            auth_token_leeway_seconds,
            valkey_url,
            session_cookie,
            delegated_auth_url,
            delegated_auth_timeout,
            delegated_cookie_name,
            external_login_url,
        })
    }
}
