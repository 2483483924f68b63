use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, Environment};
use crate::database::DatabaseManager;
use crate::handlers::{companies, jobs, users};
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_admin_or_self, ensure_logged_in};

/// Shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The full API. Every request passes `authenticate_jwt` first; per-route
/// guards then decide whether the resolved identity may continue.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        // Global middleware
        .layer(middleware::from_fn(authenticate_jwt))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn logged_in(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(ensure_logged_in))
}

fn admin(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(ensure_admin))
}

fn admin_or_self(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(ensure_admin_or_self))
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(companies::list).merge(admin(post(companies::create))),
        )
        .route(
            "/companies/:handle",
            get(companies::get).merge(admin(patch(companies::update).delete(companies::remove))),
        )
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list).merge(admin(post(jobs::create))))
        .route(
            "/jobs/:id",
            get(jobs::get).merge(admin(patch(jobs::update).delete(jobs::remove))),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", logged_in(get(users::me)))
        .route("/users", admin(get(users::list)))
        .route(
            "/users/:username",
            admin_or_self(get(users::get).patch(users::update).delete(users::remove)),
        )
        .route("/users/:username/jobs/:id", admin_or_self(post(users::apply)))
}

fn cors_layer() -> CorsLayer {
    let config = config::config();
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    match config.environment {
        Environment::Development | Environment::Test => CorsLayer::permissive(),
        _ => {
            let origins: Vec<HeaderValue> = config
                .security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Jobly API",
            "version": version,
            "endpoints": {
                "companies": "/companies[/:handle] (read: public, write: admin)",
                "jobs": "/jobs[/:id] (read: public, write: admin)",
                "users": "/users (admin), /users/:username[/jobs/:id] (admin or self), /me (logged in)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
