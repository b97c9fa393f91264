use std::{future::Future, pin::Pin};

use crate::services::cache::CacheError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The single session record a subject may hold.
///
/// `token` is the one token currently considered valid for `subject`;
/// storing a new one replaces it, which is what makes a login elsewhere
/// observable to holders of the old token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub subject: String,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Process-wide map from subject identity to its active session record.
///
/// Contract:
/// - `lookup` returning `None` means "not logged in", never a failure.
/// - `put` inserts or replaces (replace-on-login semantics).
/// - `invalidate` is idempotent; removing an absent record is `Ok`.
/// - `Err(_)` is a backend failure; auth callers must treat it as
///   authentication failure (fail-closed).
pub trait SessionStore: Send + Sync {
    fn lookup<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, SessionError>>;

    fn put<'a>(
        &'a self,
        subject: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>>;

    fn invalidate<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<(), SessionError>>;
}
