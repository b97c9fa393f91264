//! Access token codec (HS256).
//!
//! One shared secret, one fixed algorithm. `Validation` is pinned to HS256
//! so a token signed under any other algorithm fails verification outright.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),

    #[error("jwt error: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),
}

/// Decoded access token payload.
///
/// `sub` carries the subject identity the session store is keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Signs and verifies access tokens.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a signed token for `sub` with the configured TTL.
    ///
    /// The login flow that calls this is outside this crate's scope; the
    /// signing half lives here so the codec stays one unit of key handling.
    /// A fresh `jti` makes every issued token distinct, which is what turns
    /// a second login into an observable token rotation.
    pub fn sign(&self, sub: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = AccessClaims {
            sub: sub.to_string(),
            exp: now + self.ttl_seconds,
            iat: Some(now),
            jti: Some(Uuid::new_v4().to_string()),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(TokenError::Jwt)
    }

    /// Verify signature and expiry, then decode the payload.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    TokenError::Expired
                } else {
                    TokenError::Jwt(e)
                }
            })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(TokenError::EmptyClaim("sub"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, 3600, 0)
    }

    fn encode_with(alg: Algorithm, claims: &AccessClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        Utc::now().timestamp() as u64
    }

    #[test]
    fn sign_then_decode_round_trips_subject() {
        let codec = codec();
        let token = codec.sign("alice@example.com").unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.exp > now());
        assert!(claims.jti.is_some());
    }

    #[test]
    fn two_tokens_for_one_subject_differ() {
        let codec = codec();
        let t1 = codec.sign("alice@example.com").unwrap();
        let t2 = codec.sign("alice@example.com").unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let claims = AccessClaims {
            sub: "alice@example.com".to_string(),
            exp: now() - 120,
            iat: Some(now() - 3600),
            jti: None,
        };
        let token = encode_with(Algorithm::HS256, &claims);
        let err = codec().decode(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let codec = codec();
        let mut token = codec.sign("alice@example.com").unwrap();
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });
        let err = codec.decode(&token).unwrap_err();
        assert!(matches!(err, TokenError::Jwt(_)));
    }

    #[test]
    fn foreign_algorithm_is_rejected() {
        let claims = AccessClaims {
            sub: "alice@example.com".to_string(),
            exp: now() + 3600,
            iat: None,
            jti: None,
        };
        // Same secret, different algorithm: must not verify.
        let token = encode_with(Algorithm::HS384, &claims);
        let err = codec().decode(&token).unwrap_err();
        assert!(matches!(err, TokenError::Jwt(_)));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = codec().decode("not-a-token").unwrap_err();
        assert!(matches!(err, TokenError::Jwt(_)));
    }

    #[test]
    fn blank_subject_is_rejected() {
        let claims = AccessClaims {
            sub: "   ".to_string(),
            exp: now() + 3600,
            iat: None,
            jti: None,
        };
        let token = encode_with(Algorithm::HS256, &claims);
        let err = codec().decode(&token).unwrap_err();
        assert!(matches!(err, TokenError::EmptyClaim("sub")));
    }
}
