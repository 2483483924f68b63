use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{identity_from_header, Identity};
use crate::config;

/// Per-request context shared with guards and handlers
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Resolve the bearer credential (if any) and attach a `RequestContext`.
///
/// Runs on every route. A missing or bad token only leaves the identity
/// empty; the guards decide whether that is acceptable.
pub async fn authenticate_jwt(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = identity_from_header(header, &config::config().security.jwt_secret);
    if let Some(identity) = &identity {
        tracing::debug!("Authenticated {} (admin: {})", identity.subject, identity.is_admin);
    }

    request.extensions_mut().insert(RequestContext { identity });

    next.run(request).await
}
