use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::state::AppState;

use super::AuthCtx;

/// Handler-side extractor for `AuthCtx`.
/// Assumes the required guard already inserted it into request.extensions();
/// absence means the route is not guarded (misconfiguration) and yields 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Extractor for routes behind the optional guard, where an anonymous
/// request is legitimate. Never rejects.
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl FromRequestParts<AppState> for MaybeAuthCtx
where
    AppState: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(parts.extensions.get::<AuthCtx>().cloned()))
    }
}
