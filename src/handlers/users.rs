use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::auth::Unauthorized;
use crate::database::models::user::{self, User};
use crate::middleware::{ApiResponse, ApiResult, RequestContext};

use super::utils::ensure_updatable;

/// GET /users - admin only
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /me - the caller's own profile
pub async fn me(State(state): State<AppState>, Extension(context): Extension<RequestContext>) -> ApiResult<Value> {
    let identity = context.identity().ok_or(Unauthorized)?;
    let user = User::get(&state.pool, &identity.subject).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// GET /users/:username - admin or that user
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    let user = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username - admin or that user
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(data): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    ensure_updatable(&data, user::UPDATABLE_FIELDS)?;
    let user = User::update(&state.pool, &username, &data).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username - admin or that user
pub async fn remove(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    User::remove(&state.pool, &username).await?;
    tracing::info!("Deleted user {}", username);
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - admin or that user
pub async fn apply(State(state): State<AppState>, Path((username, id)): Path<(String, i32)>) -> ApiResult<Value> {
    User::apply_to_job(&state.pool, &username, id).await?;
    Ok(ApiResponse::success(json!({ "applied": id })))
}
