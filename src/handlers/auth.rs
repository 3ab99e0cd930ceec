// src/handlers/auth.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{Config, RESET_TOKEN_TTL_SECS},
    error::{AppError, is_unique_violation},
    extract::Json,
    models::user::{
        GoogleCallbackParams, RefreshRequest, ResetPasswordRequest, ResetRequest, SignInRequest,
        SignUpRequest, User,
    },
    utils::{
        hash::{generate_reset_token, hash_password, verify_password},
        jwt::{TokenType, issue_token_pair, sign_jwt, verify_jwt},
        oauth, sql_timestamp,
    },
};

const USER_COLUMNS: &str = "id, name, email, password, role, created_at";
const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub(crate) async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub(crate) async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Inserts a user and returns the stored row.
pub(crate) async fn insert_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest("A user with this email already exists.".to_string())
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        }
    })
}

/// Registers a new mentee account.
///
/// Hashes the password using Argon2 before storing it and returns a token
/// pair together with the user (excluding password).
pub async fn sign_up(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = payload.into_account()?;

    let hashed_password = hash_password(&account.password)?;
    let user = insert_user(&pool, &account.name, &account.email, &hashed_password, "mentee").await?;

    tracing::info!("New account {} ({})", user.id, user.email);

    let tokens = issue_token_pair(&user, &config)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "access": tokens.access,
            "refresh": tokens.refresh,
            "user": user,
        })),
    ))
}

/// Authenticates a user and returns an access/refresh token pair.
pub async fn sign_in(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let identifier = payload
        .email
        .or(payload.username)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Must include \"username\" or \"email\" and \"password\".".to_string())
        })?;

    let user = find_user_by_email(&pool, identifier.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest(BAD_CREDENTIALS.to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::BadRequest(BAD_CREDENTIALS.to_string()));
    }

    let tokens = issue_token_pair(&user, &config)?;
    Ok(Json(json!({
        "access": tokens.access,
        "refresh": tokens.refresh,
        "user": user,
    })))
}

/// Trades a refresh token for a new access token.
pub async fn refresh_token(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = verify_jwt(&payload.refresh, &config.jwt_secret)
        .ok()
        .filter(|c| c.token_type == TokenType::Refresh)
        .ok_or_else(|| AppError::BadRequest("Token is invalid or expired.".to_string()))?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::BadRequest("Token is invalid or expired.".to_string()))?;

    let user = find_user_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found.".to_string()))?;

    let access = sign_jwt(
        &user,
        TokenType::Access,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({ "access": access })))
}

/// Public profile lookup by email.
pub async fn get_user(
    State(pool): State<SqlitePool>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": user })))
}

/// Starts a password reset.
///
/// The response never reveals whether the account exists. Email delivery is
/// not wired up, so the reset link is written to the log.
pub async fn request_password_reset(
    State(pool): State<SqlitePool>,
    Json(payload): Json<ResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(user) = find_user_by_email(&pool, &payload.email).await? {
        let token = generate_reset_token();
        let expiry = chrono::Utc::now() + chrono::Duration::seconds(RESET_TOKEN_TTL_SECS);

        sqlx::query("UPDATE users SET reset_token = ?, reset_token_expiry = ? WHERE id = ?")
            .bind(&token)
            .bind(sql_timestamp(expiry))
            .bind(user.id)
            .execute(&pool)
            .await?;

        tracing::info!(
            "Password reset requested for {}: /signin?resetToken={}",
            user.email,
            token
        );
    }

    Ok(Json(json!({
        "message": "If an account exists with this email, a password reset link has been sent."
    })))
}

/// Completes a password reset with a still-valid token.
pub async fn reset_password(
    State(pool): State<SqlitePool>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed = hash_password(&payload.new_password)?;
    let now = sql_timestamp(chrono::Utc::now());

    // Single statement: the token is consumed exactly once.
    let result = sqlx::query(
        r#"
        UPDATE users
        SET password = ?, reset_token = NULL, reset_token_expiry = NULL
        WHERE reset_token = ? AND reset_token_expiry > ?
        "#,
    )
    .bind(hashed)
    .bind(&payload.reset_token)
    .bind(now)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Password reset successful" })))
}

/// Returns the Google consent URL.
pub async fn google_auth(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let google = config.google.as_ref().ok_or_else(|| {
        AppError::InternalServerError(
            "Google OAuth not configured. Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET".to_string(),
        )
    })?;

    let url = oauth::authorization_url(google)?;
    Ok(Json(json!({ "authUrl": url.as_str() })))
}

/// OAuth redirect target. Always answers with a redirect to the sign-in page.
pub async fn google_callback(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Query(params): Query<GoogleCallbackParams>,
) -> Result<Redirect, AppError> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Invalid authorization code".to_string()))?;

    let target = match google_login(&pool, &config, &code).await {
        Ok((user, tokens)) => signin_redirect(&[
            ("googleSuccess", "true"),
            ("access", &tokens.access),
            ("refresh", &tokens.refresh),
            ("email", &user.email),
        ]),
        Err(e) => {
            tracing::warn!("Google login failed: {}", e);
            signin_redirect(&[("error", &e.to_string())])
        }
    };

    Ok(Redirect::to(&target))
}

async fn google_login(
    pool: &SqlitePool,
    config: &Config,
    code: &str,
) -> Result<(User, crate::utils::jwt::TokenPair), AppError> {
    let google = config
        .google
        .as_ref()
        .ok_or_else(|| AppError::InternalServerError("Google OAuth not configured".to_string()))?;

    let profile = oauth::fetch_profile(google, code).await?;
    if !oauth::is_gmail(&profile.email) {
        return Err(AppError::Forbidden(
            "Only Gmail addresses are allowed".to_string(),
        ));
    }

    let user = match find_user_by_email(pool, &profile.email).await? {
        Some(user) => user,
        None => {
            let name = profile
                .name
                .clone()
                .unwrap_or_else(|| profile.email.split('@').next().unwrap_or_default().to_string());
            // OAuth accounts get an unguessable password; a reset sets a real one.
            let password = hash_password(&generate_reset_token())?;
            insert_user(pool, &name, &profile.email, &password, "mentee").await?
        }
    };

    let tokens = issue_token_pair(&user, config)?;
    Ok((user, tokens))
}

fn signin_redirect(pairs: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("/signin?{}", query)
}
