pub mod auth;
pub mod guards;
pub mod response;

pub use auth::{authenticate_jwt, RequestContext};
pub use guards::{ensure_admin, ensure_admin_or_self, ensure_logged_in};
pub use response::{ApiResponse, ApiResult};
