/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - Guards validate the request and store this in the request extensions;
 *   handlers only ever receive this type, scoped to one request
 */
use crate::services::auth::token::AccessClaims;

/// Context attached to a request that passed authentication.
///
/// Lives in the request extensions for exactly one request; never shared
/// across requests or stored process-wide.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    claims: AccessClaims,
}

impl AuthCtx {
    pub fn new(claims: AccessClaims) -> Self {
        Self { claims }
    }

    /// The authenticated subject identity (`sub` claim).
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn claims(&self) -> &AccessClaims {
        &self.claims
    }
}
