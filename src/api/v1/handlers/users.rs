/*
 * Responsibility
 * - /users handlers
 * - Json via extractors, DTO validation, then repo calls
 * - Identity comes from AuthCtx (the token subject), never from the path
 */
use axum::{Json, extract::State, http::StatusCode};
use sha2::{Digest, Sha256};

use crate::{
    api::v1::dto::users::{CreateUserRequest, UserResponse},
    api::v1::extractors::{AuthCtxExtractor, MaybeAuthCtx},
    error::AppError,
    repos::user_repo,
    state::AppState,
};

/// POST /users. Open to anonymous callers; when the caller is authenticated
/// (optional guard), the creating subject is recorded in the access log.
pub async fn create_user(
    State(state): State<AppState>,
    MaybeAuthCtx(auth): MaybeAuthCtx,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    if user_repo::exists(&state.db, &req.username).await? {
        return Err(AppError::conflict(
            "USER_EXISTS",
            "username is already registered",
        ));
    }

    // The unique index backstops the check above under concurrent creates.
    let row = user_repo::create(&state.db, &req.username, &digest_password(&req.password))
        .await
        .map_err(|e| match e {
            crate::repos::error::RepoError::Conflict => {
                AppError::conflict("USER_EXISTS", "username is already registered")
            }
            other => other.into(),
        })?;

    tracing::info!(
        username = %row.username,
        created_by = auth.as_ref().map(|ctx| ctx.subject()).unwrap_or("anonymous"),
        "user created"
    );

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: row.id,
            username: row.username,
        }),
    ))
}

/// GET /users/me. The required guard already validated the session; the
/// record is fetched for the token subject.
pub async fn get_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get_by_username(&state.db, ctx.subject())
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse {
        id: row.id,
        username: row.username,
    }))
}

fn digest_password(password: &str) -> String {
    // Storage hygiene only; password policy is out of scope here.
    hex::encode(Sha256::digest(password.as_bytes()))
}
