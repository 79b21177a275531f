/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiJson, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    auth::{jwt, password},
    models::{
        unique_violation,
        user::{CreateUser, User},
    },
};
use validator::Validate;

const DUPLICATE_EMAIL: &str = "User with this email already exists";

/// Register request
///
/// Fields default to empty so that a missing field is reported with the
/// same message as a blank one.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Register response (201)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Runs a CPU-heavy password operation off the async runtime
async fn blocking<T, F>(op: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, password::PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| ApiError::InternalError(format!("Password task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
///
/// { "name": "Demo User", "email": "demo@example.com", "password": "demo1234" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, invalid email, weak password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required".to_string(),
        ));
    }

    req.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        tracing::info!(email = %req.email, "Registration rejected: email taken");
        return Err(ApiError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let plaintext = req.password;
    let password_hash = blocking(move || password::hash_password(&plaintext)).await?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name.trim().to_string(),
        },
    )
    .await
    .map_err(|e| match unique_violation(&e) {
        Some(_) => ApiError::Conflict(DUPLICATE_EMAIL.to_string()),
        None => ApiError::from(e),
    })?;

    let (access_token, refresh_token) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success",
            message: "User created successfully",
            user,
            access_token,
            refresh_token,
        }),
    ))
}

/// Authenticates a user and returns JWT tokens
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone();
    let plaintext = req.password;
    let valid = blocking(move || password::verify_password(&plaintext, &hash)).await?;
    if !valid {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;

    let (access_token, refresh_token) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        status: "success",
        user,
        access_token,
        refresh_token,
    }))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or deleted account
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    if !User::exists(&state.db, claims.sub).await? {
        return Err(ApiError::Unauthorized("User no longer exists".to_string()));
    }

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"demo@example.com"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            name: "Demo".to_string(),
            email: "not-an-email".to_string(),
            password: "demo1234".to_string(),
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(details[0].field, "email");
        assert_eq!(details[0].message, "Invalid email format");
    }
}
