use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{NewUser, User, UserUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload, ValidatedJson};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Substring of the user name to search for
    pub name: Option<String>,
}

fn log_failure(action: &str, err: ApiError) -> ApiError {
    tracing::warn!("Failed to {}: {}", action, err);
    err
}

/// GET /api/v1/users - List users, optionally filtered by `?name=`
///
/// Responds 204 with no body when nothing matches.
pub async fn get_all(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let name = query.name.unwrap_or_default();
    let users = state
        .users
        .get_all(&name)
        .await
        .map_err(|e| log_failure("get all users", e))?;

    if users.is_empty() {
        return Ok(ApiResponse::<()>::no_content().into_response());
    }

    Ok(ApiResponse::success(users).into_response())
}

/// GET /api/v1/users/:id - Get a single user by ID
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state
        .users
        .get_by_id(&id)
        .await
        .map_err(|e| log_failure("get user", e))?;

    Ok(ApiResponse::success(user))
}

/// POST /api/v1/users - Create a user
///
/// Expected Input:
/// ```json
/// {
///   "name": "John Doe",
///   "email": "john@example.com",
///   "cpf": "313.716.772-80",
///   "birthdate": "1990-01-01T00:00:00Z"
/// }
/// ```
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewUser>,
) -> ApiResult<User> {
    let user = state
        .users
        .create(payload)
        .await
        .map_err(|e| log_failure("create user", e))?;

    tracing::info!("Created user {}", user.id);
    Ok(ApiResponse::created(user))
}

/// PUT|PATCH /api/v1/users/:id - Update the provided fields of a user
///
/// Omitted fields, empty strings and `0001-01-01T00:00:00Z` leave the stored
/// value untouched.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UserUpdate>,
) -> ApiResult<User> {
    let user = state
        .users
        .update(&id, payload)
        .await
        .map_err(|e| log_failure("update user", e))?;

    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:id - Delete a user
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    state
        .users
        .delete(&id)
        .await
        .map_err(|e| log_failure("delete user", e))?;

    tracing::info!("Deleted user {}", id);
    Ok(ApiResponse::<()>::no_content().into_response())
}
