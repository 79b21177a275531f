/// Error handling for the API server
///
/// Two response shapes exist side by side:
///
/// - [`ApiError`] for the auth, health and diagnostics endpoints:
///   `{"status": "error", "error": "<code>", "message": "...", "details": [...]}`
/// - [`ActionError`] / [`ActionResponse`] for the data endpoints, which use the
///   action envelope `{"success": bool, "error"?: string, "data"?: T}`
///
/// Both carry a meaningful HTTP status code.
///
/// # Example
///
/// ```
/// use staffboard_api::error::{ok, ActionError, ActionResult};
///
/// async fn handler(found: bool) -> ActionResult<&'static str> {
///     if !found {
///         return Err(ActionError::NotFound("Employee not found".to_string()));
///     }
///     Ok(ok("John Doe"))
/// }
/// ```

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use staffboard_shared::auth::{jwt::JwtError, middleware::AuthError, password::PasswordError};
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Error type of the auth, health and diagnostics endpoints
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Validation errors (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500); the message is logged, not returned
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format of [`ApiError`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,

    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => {
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string());
                (StatusCode::BAD_REQUEST, "validation_error", message, Some(errors))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            status: "error".to_string(),
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                ApiError::ServiceUnavailable("Database is unavailable".to_string())
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::UnknownUser => ApiError::Unauthorized("User no longer exists".to_string()),
            AuthError::DatabaseError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Failed to create token: {}", msg))
            }
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Converts `validator` errors into field details, sorted by field name
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// JSON body extractor whose rejection is an [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// ---------------------------------------------------------------------------
// Action envelope
// ---------------------------------------------------------------------------

/// Result type of the data endpoints
pub type ActionResult<T> = Result<ActionResponse<T>, ActionError>;

/// `{success, error?, data?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Successful envelope carrying `data`
pub fn ok<T>(data: T) -> ActionResponse<T> {
    ActionResponse {
        success: true,
        error: None,
        data: Some(data),
    }
}

/// Successful envelope without data
pub fn done() -> ActionResponse<()> {
    ActionResponse {
        success: true,
        error: None,
        data: None,
    }
}

impl ActionResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        ActionResponse {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error of a data endpoint
#[derive(Debug)]
pub enum ActionError {
    /// Malformed or invalid input (400)
    Validation(String),

    /// Missing, or owned by another user (404)
    NotFound(String),

    /// Uniqueness conflict (409)
    Conflict(String),

    /// Unexpected failure (500); `message` is returned, `cause` is only logged
    Internal { message: String, cause: String },
}

impl ActionError {
    /// Wraps an unexpected error as "Failed to <action>"
    pub fn internal(action: &str, cause: impl fmt::Display) -> Self {
        ActionError::Internal {
            message: format!("Failed to {}", action),
            cause: cause.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ActionError::Validation(msg)
            | ActionError::NotFound(msg)
            | ActionError::Conflict(msg)
            | ActionError::Internal { message: msg, .. } => msg,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ActionError::Validation(_) => StatusCode::BAD_REQUEST,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::Conflict(_) => StatusCode::CONFLICT,
            ActionError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Internal { message, cause } => write!(f, "{}: {}", message, cause),
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for ActionError {}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        if let ActionError::Internal { message, cause } = &self {
            tracing::error!(error = %cause, "{}", message);
        }

        let status = self.status();
        (status, Json(ActionResponse::failure(self.message()))).into_response()
    }
}

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        ActionError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ActionError {
    fn from(rejection: QueryRejection) -> Self {
        ActionError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ActionError {
    fn from(rejection: PathRejection) -> Self {
        ActionError::Validation(rejection.body_text())
    }
}

impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        let message = validation_details(&errors)
            .into_iter()
            .next()
            .map(|d| d.message)
            .unwrap_or_else(|| "Invalid input".to_string());
        ActionError::Validation(message)
    }
}

/// Tags any error as the unexpected failure of an action
pub trait OrFail<T> {
    fn or_fail(self, action: &str) -> Result<T, ActionError>;
}

impl<T, E: fmt::Display> OrFail<T> for Result<T, E> {
    fn or_fail(self, action: &str) -> Result<T, ActionError> {
        self.map_err(|e| ActionError::internal(action, e))
    }
}

/// JSON body extractor for data endpoints
///
/// Malformed bodies become a 400 action envelope instead of axum's plain-text
/// rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ActionError))]
pub struct ActionJson<T>(pub T);

/// Query string extractor for data endpoints
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ActionError))]
pub struct ActionQuery<T>(pub T);

/// Path parameter extractor for data endpoints
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ActionError))]
pub struct ActionPath<T>(pub T);

/// Validates a payload, reporting the first failing field
pub fn validate<T: Validate>(payload: &T) -> Result<(), ActionError> {
    payload.validate().map_err(ActionError::from)
}

/// `validator` custom rule rejecting empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[tokio::test]
    async fn test_api_error_body() {
        let response = ApiError::Conflict("User with this email already exists".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "conflict");
        assert_eq!(json["message"], "User with this email already exists");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_uses_first_message() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid email format");
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = ApiError::InternalError("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_action_envelope_success() {
        let json = body_json(ok(vec![1, 2]).into_response()).await;
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));

        let json = body_json(done().into_response()).await;
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[tokio::test]
    async fn test_action_error_statuses() {
        let cases = [
            (ActionError::Validation("Name is required".to_string()), StatusCode::BAD_REQUEST),
            (ActionError::NotFound("Employee not found".to_string()), StatusCode::NOT_FOUND),
            (ActionError::Conflict("Employee ID already exists".to_string()), StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            let message = err.message().to_string();
            let response = err.into_response();
            assert_eq!(response.status(), status);
            let json = body_json(response).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], message);
            assert!(json.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_internal_action_error_is_generic() {
        let err: Result<(), _> = Err::<(), _>("duplicate key").or_fail("create employee");
        let response = err.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to create employee");
    }

    #[derive(Debug, Deserialize)]
    struct MonthFilter {
        month: Option<u32>,
    }

    async fn send(uri: &str) -> (StatusCode, serde_json::Value) {
        use axum::{body::Body, http::Request, routing::get, Router};
        use tower::Service as _;

        let mut app = Router::new()
            .route(
                "/items/:id",
                get(|ActionPath(id): ActionPath<uuid::Uuid>| async move { ok(id) }),
            )
            .route(
                "/items",
                get(|ActionQuery(filter): ActionQuery<MonthFilter>| async move { ok(filter.month) }),
            );

        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.call(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_malformed_path_and_query_use_envelope() {
        let (status, json) = send("/items/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("UUID"));

        let (status, json) = send("/items?month=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());

        let (status, json) = send("/items?month=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], 3);
    }

    #[derive(Debug, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validate_reports_field_message() {
        let err = validate(&Payload { name: String::new() }).unwrap_err();
        assert_eq!(err.message(), "Name is required");
        assert!(validate(&Payload { name: "x".to_string() }).is_ok());
    }
}
