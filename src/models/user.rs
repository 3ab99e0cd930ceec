// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unique email, also used as the login name.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'mentee', 'mentor' or 'admin'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Signup body. Two shapes are accepted: the web client sends
/// `email/password/displayName`, older clients send
/// `username/email/password1/password2`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
    pub display_name: Option<String>,
}

/// A signup request after the accepted shapes have been normalized.
#[derive(Debug, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be at least 6 characters."
    ))]
    pub password: String,
}

impl SignUpRequest {
    /// Resolves which signup shape was sent and validates it.
    pub fn into_account(self) -> Result<NewAccount, AppError> {
        let account = match self {
            SignUpRequest {
                username: None,
                email: Some(email),
                password: Some(password),
                display_name: Some(display_name),
                password1: None,
                password2: None,
            } => NewAccount {
                name: display_name,
                email,
                password,
            },
            SignUpRequest {
                username: Some(username),
                email: Some(email),
                password1: Some(password1),
                password2: Some(password2),
                display_name,
                ..
            } => {
                if password1 != password2 {
                    return Err(AppError::BadRequest(
                        "The two password fields didn't match.".to_string(),
                    ));
                }
                NewAccount {
                    name: display_name.unwrap_or(username),
                    email,
                    password: password1,
                }
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Invalid request format. Provide either (username, email, password1, password2) or (email, password, displayName).".to_string(),
                ));
            }
        };

        account.validate()?;
        Ok(account)
    }
}

/// DTO for user login. Either `email` or `username` identifies the account.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(length(min = 1, message = "Email required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token required"))]
    pub reset_token: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be at least 6 characters"
    ))]
    pub new_password: String,
}

/// Query string of the Google OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
}
