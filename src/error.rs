// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::database::sanitize::SanitizeError;

/// One rejected request field, reported back as `invalidArgs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidArgument {
    pub field: String,
    pub value: String,
    pub tag: String,
    pub param: String,
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(Vec<InvalidArgument>),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound { name: String, value: String },

    // 409 Conflict
    Conflict { name: String, detail: String },

    // 500 Internal Server Error
    Internal,

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Error type tag for client handling
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => "BADREQUEST",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOTFOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal => "INTERNAL",
            ApiError::ServiceUnavailable(_) => "UNAVAILABLE",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(reason) => format!("Bad request. Reason: {}", reason),
            ApiError::Validation(_) => {
                "Bad request. Reason: Invalid request parameters. See invalidArgs".to_string()
            }
            ApiError::Forbidden(reason) => format!("Forbidden. Reason: {}", reason),
            ApiError::NotFound { name, value } if value.is_empty() => {
                format!("resource: {} not found", name)
            }
            ApiError::NotFound { name, value } => {
                format!("resource: {} with value: {} not found", name, value)
            }
            ApiError::Conflict { name, detail } => {
                format!("resource: {} not created: {}", name, detail)
            }
            ApiError::Internal => "Internal server error.".to_string(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": {
                "type": self.error_type(),
                "message": self.message(),
            }
        });

        if let ApiError::Validation(invalid_args) = self {
            body["invalidArgs"] = json!(invalid_args);
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        ApiError::BadRequest(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ApiError::Forbidden(reason.into())
    }

    pub fn not_found(name: impl Into<String>, value: impl Into<String>) -> Self {
        ApiError::NotFound { name: name.into(), value: value.into() }
    }

    pub fn conflict(name: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::Conflict { name: name.into(), detail: detail.into() }
    }

    pub fn internal() -> Self {
        ApiError::Internal
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<SanitizeError> for ApiError {
    fn from(err: SanitizeError) -> Self {
        tracing::error!("Failed to sanitize update parameters: {}", err);
        ApiError::Internal
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { name, value } => ApiError::NotFound { name, value },
            DatabaseError::Conflict { name, detail } => ApiError::Conflict { name, detail },
            DatabaseError::Sanitize(e) => e.into(),
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::Internal
            }
            other @ (DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl) => {
                tracing::error!("Database misconfigured: {}", other);
                ApiError::Internal
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
