/*
 * Responsibility
 * - 環境変数の読み込み (JWT_SECRET, PORT, CORS 許可、JWT の iss/aud など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Upper bound for `JWT_LEEWAY_SECONDS`; jsonwebtoken subtracts the leeway
/// from the current time without saturating.
pub const MAX_JWT_LEEWAY_SECONDS: u64 = 24 * 60 * 60;

const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const MAX_BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 10 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
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

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HMAC shared secret used to verify every bearer token
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Vec<String>,
    pub jwt_leeway_seconds: u64,

    // transport limits applied to every route (middleware::http)
    pub http_body_limit_bytes: usize,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// `from_env` is the production entry point; tests pass a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let cors_allowed_origins = split_list(lookup("CORS_ALLOWED_ORIGINS"));

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_issuer = lookup("JWT_ISSUER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let jwt_audience = split_list(lookup("JWT_AUDIENCE"));

        let jwt_leeway_seconds =
            parse_bounded(&lookup, "JWT_LEEWAY_SECONDS", 0, 0..=MAX_JWT_LEEWAY_SECONDS)?;

        let http_body_limit_bytes = parse_bounded(
            &lookup,
            "HTTP_BODY_LIMIT_BYTES",
            DEFAULT_BODY_LIMIT_BYTES,
            1..=MAX_BODY_LIMIT_BYTES,
        )?;

        let http_timeout = Duration::from_secs(parse_bounded(
            &lookup,
            "HTTP_TIMEOUT_SECONDS",
            DEFAULT_TIMEOUT_SECONDS,
            1..=MAX_TIMEOUT_SECONDS,
        )?);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_leeway_seconds,
            http_body_limit_bytes,
            http_timeout,
        })
    }
}

// Unset → default. Set but unparsable or out of range → Invalid.
fn parse_bounded<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|v| range.contains(v))
        .ok_or(ConfigError::Invalid(key))
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
}
