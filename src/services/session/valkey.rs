use std::{sync::Arc, time::Duration};

use crate::services::cache::{CacheClient, ValkeyClient};
use crate::services::session::store::{BoxFuture, SessionError, SessionRecord, SessionStore};

/// Valkey-backed session store (Redis protocol).
///
/// One `session:<subject>` key per subject holding the active token. Single
/// key commands are atomic on the backend, so replace/invalidate keep the
/// last-writer-wins behavior of the in-memory store. Backend failures are
/// surfaced as `SessionError`; auth callers treat that as fail-closed.
#[derive(Clone)]
pub struct ValkeySessionStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix, avoids collisions across environments sharing one backend.
    prefix: String,
    ttl: Duration,
}

impl ValkeySessionStore<ValkeyClient> {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self, SessionError> {
        let client = ValkeyClient::new(redis_url).await?;
        Ok(Self::new_with_cache(
            Arc::new(client),
            "session",
            ttl_seconds,
        ))
    }
}

impl<C: CacheClient> ValkeySessionStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    fn key(&self, subject: &str) -> String {
        format!("{}:{}", self.prefix, subject)
    }
}

impl<C: CacheClient> SessionStore for ValkeySessionStore<C> {
    fn lookup<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, SessionError>> {
        Box::pin(async move {
            let token = self.cache.get_string(&self.key(subject)).await?;
            Ok(token.map(|token| SessionRecord {
                subject: subject.to_string(),
                token,
            }))
        })
    }

    fn put<'a>(
        &'a self,
        subject: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.cache
                .set_with_ttl(&self.key(subject), token, self.ttl)
                .await?;
            Ok(())
        })
    }

    fn invalidate<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            // DEL of an absent key deletes 0 keys; invalidate stays idempotent.
            self.cache.del(&self.key(subject)).await?;
            Ok(())
        })
    }
}
