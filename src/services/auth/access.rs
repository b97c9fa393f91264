//! Request authentication against the active session.
//!
//! Composes the header policy, the token codec and the session store into
//! the one validation routine both guards share. A token can verify
//! cryptographically and still be dead: the session store holds the single
//! token currently valid per subject, and anything else is rejected.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::warn;

use crate::services::auth::error::AuthError;
use crate::services::auth::header::HeaderPolicy;
use crate::services::auth::token::{AccessClaims, TokenCodec};
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AuthService {
    codec: TokenCodec,
    header: HeaderPolicy,
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("header", &self.header)
            .field("codec", &self.codec)
            .finish()
    }
}

impl AuthService {
    pub fn new(codec: TokenCodec, header: HeaderPolicy, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            codec,
            header,
            sessions,
        }
    }

    /// Validate one request's credentials.
    ///
    /// Steps, each terminal on failure (no retries):
    /// 1. extract the raw token from the configured header,
    /// 2. decode and verify it,
    /// 3. look up the subject's session record; absent means not logged in,
    /// 4. compare the stored token with the presented one byte for byte. On
    ///    mismatch the whole session is revoked before failing, so a single
    ///    stale-token use forces a fresh login. The revocation persists even
    ///    though this request is rejected.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AccessClaims, AuthError> {
        let token = self.header.extract(headers)?;
        let claims = self.codec.decode(token)?;

        let record = self
            .sessions
            .lookup(claims.sub.as_str())
            .await?
            .ok_or(AuthError::NoActiveSession)?;

        if record.token != token {
            self.sessions.invalidate(claims.sub.as_str()).await?;
            warn!(
                subject = %claims.sub,
                "presented token does not match the active session, session revoked"
            );
            return Err(AuthError::SessionSuperseded);
        }

        Ok(claims)
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The store surface the (external) login/logout flow writes through.
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    use crate::services::session::InMemorySessionStore;

    fn service() -> AuthService {
        AuthService::new(
            TokenCodec::new("test-secret", 3600, 0),
            HeaderPolicy::new("Authorization", Some("Bearer")).unwrap(),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn missing_header_propagates() {
        let err = service().authenticate(&HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingHeader { .. }));
    }

    #[tokio::test]
    async fn valid_token_without_session_is_denied() {
        let svc = service();
        let token = svc.codec().sign("alice").unwrap();

        let err = svc.authenticate(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::NoActiveSession));
    }

    #[tokio::test]
    async fn matching_session_returns_the_claims() {
        let svc = service();
        let token = svc.codec().sign("alice").unwrap();
        svc.sessions().put("alice", &token).await.unwrap();

        let claims = svc.authenticate(&bearer(&token)).await.unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn mismatched_token_revokes_the_session() {
        let svc = service();
        let stale = svc.codec().sign("alice").unwrap();
        let current = svc.codec().sign("alice").unwrap();
        svc.sessions().put("alice", &current).await.unwrap();

        let err = svc.authenticate(&bearer(&stale)).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionSuperseded));

        // The side effect persists: the record is gone, not just this request.
        assert!(svc.sessions().lookup("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_token_use_kills_the_whole_session() {
        // alice logs in (T1), uses it, then logs in elsewhere (T2).
        let svc = service();
        let t1 = svc.codec().sign("alice").unwrap();
        svc.sessions().put("alice", &t1).await.unwrap();

        let claims = svc.authenticate(&bearer(&t1)).await.unwrap();
        assert_eq!(claims.sub, "alice");

        let t2 = svc.codec().sign("alice").unwrap();
        svc.sessions().put("alice", &t2).await.unwrap();

        // Replaying T1 is rejected and wipes the record entirely.
        let err = svc.authenticate(&bearer(&t1)).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionSuperseded));

        // So even T2 is now denied: one stale use forces a fresh login.
        let err = svc.authenticate(&bearer(&t2)).await.unwrap_err();
        assert!(matches!(err, AuthError::NoActiveSession));
    }

    #[tokio::test]
    async fn expired_token_fails_before_the_session_check() {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let svc = service();
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = AccessClaims {
            sub: "alice".to_string(),
            exp: now - 120,
            iat: Some(now - 3600),
            jti: None,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        // Even a stored matching session does not save an expired token.
        svc.sessions().put("alice", &token).await.unwrap();

        let err = svc.authenticate(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }
}
