// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Refresh token lifetime in seconds.
    pub jwt_refresh_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Location of the community post JSON store.
    pub posts_path: String,
    pub ml_python: String,
    pub ml_script: String,
    pub ml_timeout_secs: u64,
    pub google: Option<GoogleConfig>,
    pub seed_mentors: bool,
}

/// OAuth client registered with Google.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Lifetime of a password reset token, in seconds.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/mentorship.db".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let google = match (
            env::var("GOOGLE_CLIENT_ID").ok(),
            env::var("GOOGLE_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                    "http://localhost:8080/api/auth/google/callback".to_string()
                }),
            }),
            _ => None,
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 900),
            jwt_refresh_expiration: parse_or("JWT_REFRESH_EXPIRATION", 604_800),
            rust_log,
            port: parse_or("PORT", 8080),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            posts_path: env::var("POSTS_PATH").unwrap_or_else(|_| "data/posts.json".to_string()),
            ml_python: env::var("ML_PYTHON").unwrap_or_else(|_| "python3".to_string()),
            ml_script: env::var("ML_SCRIPT")
                .unwrap_or_else(|_| "../backend/inference.py".to_string()),
            ml_timeout_secs: parse_or("ML_TIMEOUT_SECS", 60),
            google,
            seed_mentors: parse_or("SEED_MENTORS", true),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
