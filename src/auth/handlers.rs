use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, CheckEmailRequest, CheckPhoneRequest, ForgotPasswordRequest,
            LoginRequest, MessageResponse, PublicUser, RegisterRequest, RegisterResponse,
            ResetPasswordRequest, UpdateProfileRequest,
        },
        repo_types::User,
        services::{
            generate_reset_code, hash_password, is_strong_password, is_valid_email,
            is_valid_phone_number, verify_password, AuthUser, JwtKeys,
        },
    },
    error::ApiError,
    mail::reset_code_message,
    state::AppState,
};

/// Reset codes are valid this long after issue.
const RESET_CODE_TTL_MINUTES: i64 = 15;
/// A code is invalidated after this many failed attempts.
const MAX_RESET_ATTEMPTS: i32 = 5;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/check-phone", post(check_phone))
        .route("/check-email", post(check_email))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email format".into()));
    }
    if !is_valid_phone_number(&payload.phone_number) {
        warn!("invalid phone number");
        return Err(ApiError::Validation("invalid phone number format".into()));
    }
    if !is_strong_password(&payload.password) {
        warn!("weak password");
        return Err(ApiError::Validation(
            "password must be at least 8 characters and contain an uppercase letter, \
             a lowercase letter and a digit"
                .into(),
        ));
    }

    // Pre-checks give friendly errors; the UNIQUE constraints still catch
    // a concurrent insert between check and create.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::AlreadyExists("this email is already registered".into()));
    }
    if User::find_by_phone(&state.db, &payload.phone_number)
        .await?
        .is_some()
    {
        warn!("phone number already registered");
        return Err(ApiError::AlreadyExists(
            "this phone number is already registered".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.first_name,
        &payload.last_name,
        &payload.phone_number,
        &payload.email,
        &hash,
    )
    .await
    .map_err(ApiError::from_db)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user registered successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User::find_by_phone(&state.db, &payload.phone_number)
        .await?
        .ok_or_else(|| {
            warn!("login unknown phone number");
            ApiError::NotFound("no account with this phone number".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            return Err(ApiError::Validation("invalid email format".into()));
        }
    }
    if let Some(phone) = payload.phone_number.as_deref() {
        if !is_valid_phone_number(phone) {
            return Err(ApiError::Validation("invalid phone number format".into()));
        }
    }

    // Changing email or phone must not collide with another account.
    if let Some(email) = payload.email.as_deref() {
        if let Some(other) = User::find_by_email(&state.db, email).await? {
            if other.id != user_id {
                return Err(ApiError::AlreadyExists("this email is already registered".into()));
            }
        }
    }
    if let Some(phone) = payload.phone_number.as_deref() {
        if let Some(other) = User::find_by_phone(&state.db, phone).await? {
            if other.id != user_id {
                return Err(ApiError::AlreadyExists(
                    "this phone number is already registered".into(),
                ));
            }
        }
    }

    let user = User::update_profile(
        &state.db,
        user_id,
        payload.first_name.as_deref(),
        payload.last_name.as_deref(),
        payload.email.as_deref(),
        payload.phone_number.as_deref(),
    )
    .await
    .map_err(ApiError::from_db)?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn check_phone(
    State(state): State<AppState>,
    Json(payload): Json<CheckPhoneRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !is_valid_phone_number(&payload.phone_number) {
        return Err(ApiError::Validation("invalid phone number format".into()));
    }
    if User::find_by_phone(&state.db, &payload.phone_number)
        .await?
        .is_some()
    {
        return Err(ApiError::AlreadyExists(
            "this phone number is already registered".into(),
        ));
    }
    Ok(Json(MessageResponse {
        message: "phone number is available".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn check_email(
    State(state): State<AppState>,
    Json(mut payload): Json<CheckEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("invalid email format".into()));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        return Err(ApiError::AlreadyExists("this email is already registered".into()));
    }
    Ok(Json(MessageResponse {
        message: "email is available".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("no account with this email".into()))?;

    let code = generate_reset_code();
    let expires = OffsetDateTime::now_utc() + TimeDuration::minutes(RESET_CODE_TTL_MINUTES);
    User::set_reset_code(&state.db, user.id, &code, expires).await?;

    // The code is already persisted at this point; a failed send leaves it
    // pending, and repeating the request issues a fresh one.
    let (subject, body) = reset_code_message(&user.first_name, &code);
    state
        .mailer
        .send(&user.email, &subject, &body)
        .await
        .map_err(ApiError::MailDelivery)?;

    info!(user_id = %user.id, "reset code sent");
    Ok(Json(MessageResponse {
        message: "a password reset code has been sent to your email".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("no account with this email".into()))?;

    let (code, expires) = match (user.reset_code.as_deref(), user.reset_code_expires) {
        (Some(code), Some(expires)) => (code, expires),
        _ => return Err(ApiError::Validation("invalid or expired code".into())),
    };

    if payload.code != code {
        let attempts = User::record_failed_reset(&state.db, user.id).await?;
        if attempts >= MAX_RESET_ATTEMPTS {
            warn!(user_id = %user.id, attempts, "reset code invalidated after repeated failures");
            User::clear_reset_code(&state.db, user.id).await?;
        }
        return Err(ApiError::Validation("incorrect code".into()));
    }

    if OffsetDateTime::now_utc() > expires {
        User::clear_reset_code(&state.db, user.id).await?;
        return Err(ApiError::Validation("the code has expired".into()));
    }

    if !is_strong_password(&payload.new_password) {
        return Err(ApiError::Validation(
            "password must be at least 8 characters and contain an uppercase letter, \
             a lowercase letter and a digit"
                .into(),
        ));
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "your password has been updated".into(),
    }))
}
