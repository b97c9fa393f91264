use thiserror::Error;

use crate::services::auth::token::TokenError;
use crate::services::session::SessionError;

/// Failure classes of request authentication, in validation order.
///
/// The first two mean "no usable credentials were presented"; everything
/// after means credentials were presented and rejected. The optional guard
/// only ever swallows the first group.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing {header_name} header")]
    MissingHeader { header_name: String },

    #[error("bad {header_name} header, expected value '{expected}'")]
    MalformedHeader {
        header_name: String,
        expected: String,
    },

    #[error("token expired, please log in again")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(#[source] TokenError),

    #[error("access denied, please log in")]
    NoActiveSession,

    #[error("invalid user session, please log in again")]
    SessionSuperseded,

    #[error("session store failure: {0}")]
    Store(#[from] SessionError),
}

impl AuthError {
    /// The narrow swallow set for the optional guard: only the absence of
    /// credentials is forgivable, never their invalidity.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(
            self,
            AuthError::MissingHeader { .. } | AuthError::MalformedHeader { .. }
        )
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::TokenExpired,
            other => AuthError::TokenInvalid(other),
        }
    }
}
