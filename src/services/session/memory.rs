use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::services::session::store::{BoxFuture, SessionError, SessionRecord, SessionStore};

/// In-memory session store, the default backend.
///
/// All record operations go through one RwLock, so a lookup never observes a
/// torn record. An `invalidate` racing a `lookup` resolves in lock-acquisition
/// order: last writer wins on the record.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn lookup<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, SessionError>> {
        Box::pin(async move { Ok(self.inner.read().await.get(subject).cloned()) })
    }

    fn put<'a>(
        &'a self,
        subject: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            let record = SessionRecord {
                subject: subject.to_string(),
                token: token.to_string(),
            };
            self.inner.write().await.insert(subject.to_string(), record);
            Ok(())
        })
    }

    fn invalidate<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.inner.write().await.remove(subject);
            Ok(())
        })
    }
}
