use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::database::models::company::{self, Company, NewCompany};
use crate::filter::criteria_from_query;
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{ensure_updatable, list_limit};

/// POST /companies - admin only
pub async fn create(State(state): State<AppState>, Json(data): Json<NewCompany>) -> ApiResult<Value> {
    let company = Company::create(&state.pool, data).await?;
    tracing::info!("Created company {}", company.handle);
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies?minEmployees=&maxEmployees=&nameLike=
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<Value> {
    let criteria = criteria_from_query(query.as_deref());
    let companies = Company::find_all(&state.pool, &criteria, list_limit()).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - includes the company's jobs
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle - admin only
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(data): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    ensure_updatable(&data, company::UPDATABLE_FIELDS)?;
    let company = Company::update(&state.pool, &handle, &data).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle - admin only
pub async fn remove(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    tracing::info!("Deleted company {}", handle);
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
