//! The two authentication guards.
//!
//! Both wrap a sub-router around the same validation routine
//! (`AuthService::authenticate`) and attach `AuthCtx` to the request
//! extensions on success. They differ in exactly one place: the optional
//! guard lets a request with no usable credentials through anonymously,
//! while a presented-but-bad token is always an error for both.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Require authentication for every route of `router`.
///
/// Example:
/// ```ignore
/// let protected = Router::new().route("/users/me", get(get_me));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot take a State extractor in axum 0.8; pass it explicitly.
    router.layer(middleware::from_fn_with_state(state, require_auth))
}

/// Authenticate when credentials are present, continue anonymously when they
/// are absent. Routes behind this read identity via `MaybeAuthCtx`.
pub fn apply_optional(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, optional_auth))
}

async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match state.auth.authenticate(req.headers()).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, "request authentication failed");
            return Err(err.into());
        }
    };

    // middleware → extractor hand-off
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}

async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match state.auth.authenticate(req.headers()).await {
        Ok(claims) => {
            req.extensions_mut().insert(AuthCtx::new(claims));
        }
        Err(err) if err.is_missing_credentials() => {
            // No usable credentials at all: run the handler without identity.
            // Anything presented and rejected still falls through below.
            tracing::debug!(error = %err, "no credentials presented, continuing anonymously");
        }
        Err(err) => {
            tracing::warn!(error = %err, "request authentication failed");
            return Err(err.into());
        }
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        body::to_bytes,
        http::StatusCode,
        routing::get,
    };
    use tower::ServiceExt;

    use crate::api::v1::extractors::{AuthCtxExtractor, MaybeAuthCtx};
    use crate::services::auth::AuthService;
    use crate::services::auth::header::HeaderPolicy;
    use crate::services::auth::token::TokenCodec;
    use crate::services::session::InMemorySessionStore;

    fn test_state() -> AppState {
        let auth = AuthService::new(
            TokenCodec::new("test-secret", 3600, 0),
            HeaderPolicy::new("Authorization", Some("Bearer")).unwrap(),
            Arc::new(InMemorySessionStore::new()),
        );
        // Lazy pool: never connects, the routes under test do not touch it.
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AppState::new(db, Arc::new(auth))
    }

    fn protected_app(state: AppState, hits: Arc<AtomicUsize>) -> Router {
        let router = Router::new().route(
            "/me",
            get(move |AuthCtxExtractor(ctx): AuthCtxExtractor| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ctx.subject().to_string()
                }
            }),
        );
        apply(router, state.clone()).with_state(state)
    }

    fn optional_app(state: AppState) -> Router {
        let router = Router::new().route(
            "/whoami",
            get(|MaybeAuthCtx(ctx): MaybeAuthCtx| async move {
                match ctx {
                    Some(ctx) => ctx.subject().to_string(),
                    None => "anonymous".to_string(),
                }
            }),
        );
        apply_optional(router, state.clone()).with_state(state)
    }

    fn request(uri: &str, auth_value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth_value {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn expired_token(sub: &str) -> String {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let now = chrono::Utc::now().timestamp() as u64;
        let claims = crate::services::auth::token::AccessClaims {
            sub: sub.to_string(),
            exp: now - 120,
            iat: Some(now - 3600),
            jti: None,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn required_rejects_missing_header_without_running_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = protected_app(test_state(), hits.clone());

        let res = app.oneshot(request("/me", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(res).await.contains("MISSING_AUTH_HEADER"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn required_rejects_malformed_header() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = protected_app(test_state(), hits.clone());

        for value in ["Bearer", "Token abc", "Bearer a b"] {
            let res = app.clone().oneshot(request("/me", Some(value))).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{value:?}");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn required_rejects_an_expired_token() {
        let app = protected_app(test_state(), Arc::new(AtomicUsize::new(0)));
        let token = expired_token("alice@example.com");

        let res = app
            .oneshot(request("/me", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(res).await.contains("TOKEN_EXPIRED"));
    }

    #[tokio::test]
    async fn required_rejects_token_without_session() {
        let state = test_state();
        let token = state.auth.codec().sign("alice@example.com").unwrap();
        let app = protected_app(state, Arc::new(AtomicUsize::new(0)));

        let res = app
            .oneshot(request("/me", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(res).await.contains("ACCESS_DENIED"));
    }

    #[tokio::test]
    async fn required_rejects_superseded_session_and_revokes_it() {
        let state = test_state();
        let stale = state.auth.codec().sign("alice@example.com").unwrap();
        let current = state.auth.codec().sign("alice@example.com").unwrap();
        state
            .auth
            .sessions()
            .put("alice@example.com", &current)
            .await
            .unwrap();
        let app = protected_app(state.clone(), Arc::new(AtomicUsize::new(0)));

        let res = app
            .oneshot(request("/me", Some(&format!("Bearer {stale}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(res).await.contains("INVALID_SESSION"));

        let record = state
            .auth
            .sessions()
            .lookup("alice@example.com")
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn required_passes_identity_and_runs_handler_once() {
        let state = test_state();
        let token = state.auth.codec().sign("alice@example.com").unwrap();
        state
            .auth
            .sessions()
            .put("alice@example.com", &token)
            .await
            .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let app = protected_app(state, hits.clone());

        let res = app
            .oneshot(request("/me", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "alice@example.com");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn optional_continues_anonymously_without_header() {
        let app = optional_app(test_state());

        let res = app.oneshot(request("/whoami", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "anonymous");
    }

    #[tokio::test]
    async fn optional_continues_anonymously_on_malformed_header() {
        let app = optional_app(test_state());

        let res = app
            .oneshot(request("/whoami", Some("Token abc")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "anonymous");
    }

    #[tokio::test]
    async fn optional_does_not_swallow_an_expired_token() {
        let app = optional_app(test_state());
        let token = expired_token("alice@example.com");

        let res = app
            .oneshot(request("/whoami", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(res).await.contains("TOKEN_EXPIRED"));
    }

    #[tokio::test]
    async fn optional_still_rejects_a_bad_token() {
        // "optional" waives absence, not invalidity.
        let app = optional_app(test_state());

        let res = app
            .oneshot(request("/whoami", Some("Bearer not-a-token")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn optional_still_rejects_a_valid_token_without_session() {
        let state = test_state();
        let token = state.auth.codec().sign("alice@example.com").unwrap();
        let app = optional_app(state);

        let res = app
            .oneshot(request("/whoami", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn optional_passes_identity_when_credentials_are_good() {
        let state = test_state();
        let token = state.auth.codec().sign("alice@example.com").unwrap();
        state
            .auth
            .sessions()
            .put("alice@example.com", &token)
            .await
            .unwrap();
        let app = optional_app(state);

        let res = app
            .oneshot(request("/whoami", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "alice@example.com");
    }
}
