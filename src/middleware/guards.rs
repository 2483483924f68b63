use axum::{
    extract::{FromRequestParts, RawPathParams, Request},
    middleware::Next,
    response::Response,
};

use super::auth::RequestContext;
use crate::auth::{gate, Identity, Unauthorized};
use crate::error::ApiError;

fn identity(request: &Request) -> Option<&Identity> {
    request
        .extensions()
        .get::<RequestContext>()
        .and_then(RequestContext::identity)
}

fn reject(request: &Request, _: Unauthorized) -> ApiError {
    tracing::warn!("Rejected {} {}", request.method(), request.uri().path());
    ApiError::from(Unauthorized)
}

/// Any logged-in user
pub async fn ensure_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    gate::require_authenticated(identity(&request)).map_err(|e| reject(&request, e))?;
    Ok(next.run(request).await)
}

/// Admins only
pub async fn ensure_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    gate::require_admin(identity(&request)).map_err(|e| reject(&request, e))?;
    Ok(next.run(request).await)
}

/// Admins, or the user named by the `:username` path parameter.
///
/// A parameter that fails to decode leaves the target empty, which only an
/// admin passes.
pub async fn ensure_admin_or_self(request: Request, next: Next) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let target = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(key, _)| *key == "username")
                .map(|(_, value)| value.to_string())
        })
        .unwrap_or_default();
    let request = Request::from_parts(parts, body);

    gate::require_admin_or_self(identity(&request), &target).map_err(|e| reject(&request, e))?;
    Ok(next.run(request).await)
}
