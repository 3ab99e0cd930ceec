// src/utils/oauth.rs

//! Google OAuth 2.0 authorization-code flow.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::{config::GoogleConfig, error::AppError};

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

static GMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@gmail\.com$").expect("static regex")
});

/// Only Gmail accounts may sign in through Google.
pub fn is_gmail(email: &str) -> bool {
    GMAIL.is_match(email)
}

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Builds the consent-screen URL the browser is sent to.
pub fn authorization_url(google: &GoogleConfig) -> Result<Url, AppError> {
    Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("client_id", google.client_id.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("response_type", "code"),
            (
                "scope",
                "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile",
            ),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Exchanges an authorization code for the signed-in user's profile.
pub async fn fetch_profile(google: &GoogleConfig, code: &str) -> Result<GoogleProfile, AppError> {
    let client = reqwest::Client::new();
    let upstream = |e: reqwest::Error| AppError::InternalServerError(e.to_string());

    let token: TokenResponse = client
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("code", code),
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(upstream)?
        .error_for_status()
        .map_err(|e| AppError::AuthError(format!("Google rejected the code: {}", e)))?
        .json()
        .await
        .map_err(upstream)?;

    client
        .get(USERINFO_ENDPOINT)
        .bearer_auth(token.access_token)
        .send()
        .await
        .map_err(upstream)?
        .error_for_status()
        .map_err(upstream)?
        .json()
        .await
        .map_err(upstream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmail_only() {
        assert!(is_gmail("someone.x+tag@gmail.com"));
        assert!(is_gmail("Someone@GMAIL.com"));
        assert!(!is_gmail("someone@example.com"));
        assert!(!is_gmail("someone@gmail.com.evil.org"));
    }

    #[test]
    fn authorization_url_carries_client() {
        let google = GoogleConfig {
            client_id: "abc".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "http://localhost:8080/api/auth/google/callback".to_string(),
        };
        let url = authorization_url(&google).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "abc".to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(!url.as_str().contains("shh"));
    }
}
