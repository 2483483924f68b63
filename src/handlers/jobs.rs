use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::database::models::job::{self, Job, NewJob};
use crate::filter::criteria_from_query;
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{ensure_updatable, list_limit};

/// POST /jobs - admin only
pub async fn create(State(state): State<AppState>, Json(data): Json<NewJob>) -> ApiResult<Value> {
    let job = Job::create(&state.pool, data).await?;
    tracing::info!("Created job {} for {}", job.id, job.company_handle);
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<Value> {
    let criteria = criteria_from_query(query.as_deref());
    let jobs = Job::find_all(&state.pool, &criteria, list_limit()).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id - admin only
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    ensure_updatable(&data, job::UPDATABLE_FIELDS)?;
    let job = Job::update(&state.pool, id, &data).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id - admin only
pub async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    Job::remove(&state.pool, id).await?;
    tracing::info!("Deleted job {}", id);
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
