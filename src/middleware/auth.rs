use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Identity resolved from a bearer token, attached to request extensions by
/// [`resolve_identity`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Resolves the caller's identity once per request.
///
/// A missing `Authorization` header lets the request proceed anonymously, so
/// public routes stay reachable and extractors decide whether identity is
/// required. A header that is present but unusable (bad scheme, bad
/// signature, expired, unparseable claims) short-circuits with 401 instead of
/// silently downgrading the caller to anonymous.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if let Some(raw) = header_value {
        let token = raw.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthenticated(anyhow::anyhow!("Invalid authorization header format"))
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthenticated(anyhow::anyhow!("Invalid user ID in token")))?;

        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AppError::unauthenticated(anyhow::anyhow!("Invalid role in token")))?;

        req.extensions_mut().insert(AuthContext {
            user_id,
            username: claims.username,
            role,
        });
    }

    Ok(next.run(req).await)
}

/// Extractor for routes that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthenticated(anyhow::anyhow!("Authentication required")))
    }
}

/// Extractor for routes whose response varies with an optional identity,
/// like product detail marking whether the viewer has favorited it.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthContext>().cloned()))
    }
}
