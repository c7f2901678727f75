//! Role gate for the admin surface.
//!
//! Layered onto `/api/admin` routes after
//! [`resolve_identity`](crate::middleware::auth::resolve_identity) has run,
//! so it only inspects request extensions and never touches the token again.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthContext;
use crate::utils::errors::AppError;

/// Rejects anonymous callers with 401 and authenticated non-admins with 403.
pub async fn require_admin(req: Request, next: Next) -> Response {
    match check_admin(&req) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

fn check_admin(req: &Request) -> Result<(), AppError> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AppError::unauthenticated(anyhow::anyhow!("Authentication required")))?;

    if !ctx.is_admin() {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Administrator privileges required"
        )));
    }

    Ok(())
}
