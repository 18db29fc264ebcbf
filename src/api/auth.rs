use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use once_cell::sync::Lazy;
use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::app_state::AppState;
use crate::auth::{bearer_token, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::{Actor, NewUser, SocialProvider};
use crate::store::users::validate_username;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

const MIN_PASSWORD_CHARS: usize = 8;
const TEMP_PASSWORD_CHARS: usize = 10;

fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub code: String,
}

/// Credential signup. The email must have been verified with a code
/// requested beforehand; the code is consumed here.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    // Advisory pre-check so a taken name does not burn the code; the UNIQUE
    // constraint below remains the real guard.
    if !state.users.is_username_available(&request.username).await? {
        return Err(AppError::Conflict(format!(
            "Username \"{}\" is already taken",
            request.username
        )));
    }

    if !state
        .verification_codes
        .verify(&request.email, &request.code)
        .await
    {
        return Err(AppError::Validation(
            "Invalid or expired verification code".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state
        .users
        .create(NewUser {
            username: request.username,
            email: Some(request.email),
            password_hash: Some(password_hash),
            ..NewUser::default()
        })
        .await?;

    let token = state.sessions.issue(user.id).await?;
    tracing::info!("Signed up user {} ({})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(json!({"token": token, "user": user}))))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Unknown users and wrong passwords are indistinguishable to the caller.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    fn rejected() -> AppError {
        AppError::Unauthenticated("Invalid username or password".to_string())
    }

    let user = state
        .users
        .find_by_username(&request.username)
        .await?
        .ok_or_else(rejected)?;

    let hash = user.password_hash.as_deref().ok_or_else(rejected)?;
    if !verify_password(&request.password, hash) {
        return Err(rejected());
    }

    let token = state.sessions.issue(user.id).await?;
    Ok(Json(json!({"token": token, "user": user})))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    _actor: Actor,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    if let Some(token) = bearer_token(&headers)? {
        state.sessions.revoke(token).await?;
    }
    Ok(Json(json!({"logged_out": true})))
}

#[derive(Deserialize)]
pub struct PendingUsernameRequest {
    pub username: String,
}

/// Reserves a display name ahead of the provider redirect. The returned
/// handle is presented back on the first social sign-in.
pub async fn pending_username_handler(
    State(state): State<AppState>,
    Json(request): Json<PendingUsernameRequest>,
) -> AppResult<Json<Value>> {
    if !state
        .users
        .is_username_available(&request.username)
        .await?
    {
        return Err(AppError::Conflict(format!(
            "Username \"{}\" is already taken",
            request.username
        )));
    }

    let pending_id = state.pending_usernames.reserve(request.username).await;
    Ok(Json(json!({
        "pending_id": pending_id,
        "expires_in_secs": state.config.auth.handoff_ttl_secs
    })))
}

#[derive(Deserialize)]
pub struct SocialLoginRequest {
    pub provider: String,
    pub provider_user_id: String,
    #[serde(default)]
    pub pending_id: Option<String>,
}

/// Post-callback step of the social flow. The provider handshake itself
/// happens upstream; this exchanges the verified provider identity for a
/// session, creating the account on first sign-in.
pub async fn social_login_handler(
    State(state): State<AppState>,
    Json(request): Json<SocialLoginRequest>,
) -> AppResult<Json<Value>> {
    let provider = SocialProvider::parse(&request.provider).ok_or_else(|| {
        AppError::Validation(format!("Unknown provider: {}", request.provider))
    })?;

    if let Some(user) = state
        .users
        .find_by_provider(provider, &request.provider_user_id)
        .await?
    {
        let token = state.sessions.issue(user.id).await?;
        return Ok(Json(json!({"token": token, "user": user, "created": false})));
    }

    let pending_id = request.pending_id.ok_or_else(|| {
        AppError::Validation("A reserved username is required for first sign-in".to_string())
    })?;
    let username = state.pending_usernames.take(&pending_id).await.ok_or_else(|| {
        AppError::Validation("Username reservation expired or already used".to_string())
    })?;

    let user = state
        .users
        .create(NewUser {
            username,
            provider: Some(provider),
            provider_id: Some(request.provider_user_id),
            ..NewUser::default()
        })
        .await?;

    let token = state.sessions.issue(user.id).await?;
    tracing::info!("Created user {} via {}", user.username, provider.as_str());

    Ok(Json(json!({"token": token, "user": user, "created": true})))
}

#[derive(Deserialize)]
pub struct EmailCodeRequest {
    pub email: String,
}

pub async fn email_code_handler(
    State(state): State<AppState>,
    Json(request): Json<EmailCodeRequest>,
) -> AppResult<Json<Value>> {
    validate_email(&request.email)?;

    let code = state.verification_codes.issue(&request.email).await;

    // Fire-and-forget: delivery failure never fails the request.
    if let Err(e) = state
        .notifier
        .send_verification_code(&request.email, &code)
        .await
    {
        warn!("Failed to send verification code to {}: {}", request.email, e);
    }

    Ok(Json(json!({"sent": true})))
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

pub async fn password_reset_handler(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> AppResult<Json<Value>> {
    validate_email(&request.email)?;

    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account with that email".to_string()))?;

    let temporary: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_CHARS)
        .map(char::from)
        .collect();

    let password_hash = hash_password(&temporary)?;
    state.users.set_password(user.id, &password_hash).await?;

    if let Err(e) = state
        .notifier
        .send_temporary_password(&request.email, &temporary)
        .await
    {
        warn!("Failed to send temporary password to {}: {}", request.email, e);
    }

    Ok(Json(json!({"reset": true})))
}
