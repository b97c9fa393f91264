//! Auth header extraction.
//!
//! Responsibility:
//! - Parse the configured `<name>: [<type> ]<token>` header shape into the
//!   raw token string.
//! - Pure function of the request headers, no side effects.

use axum::http::{HeaderMap, HeaderName};

use crate::services::auth::error::AuthError;

/// Process-wide header convention, parsed once at startup.
#[derive(Clone, Debug)]
pub struct HeaderPolicy {
    name: HeaderName,
    scheme: Option<String>,
}

impl HeaderPolicy {
    /// `scheme = None` means the header value is the bare token.
    pub fn new(name: &str, scheme: Option<&str>) -> Result<Self, axum::http::header::InvalidHeaderName> {
        Ok(Self {
            name: HeaderName::from_bytes(name.as_bytes())?,
            scheme: scheme.map(|s| s.to_string()),
        })
    }

    pub fn header_name(&self) -> &str {
        self.name.as_str()
    }

    /// Pull the token out of `headers`.
    ///
    /// A header that is absent, or present with a blank value, is treated as
    /// missing. Every other deviation from the expected shape is malformed.
    /// The returned slice borrows from the header value, so the later
    /// session comparison sees the exact presented bytes.
    pub fn extract<'h>(&self, headers: &'h HeaderMap) -> Result<&'h str, AuthError> {
        let raw = headers.get(&self.name).ok_or_else(|| self.missing())?;
        let value = raw.to_str().map_err(|_| self.malformed())?;
        if value.trim().is_empty() {
            return Err(self.missing());
        }

        let parts: Vec<&str> = value.split_whitespace().collect();
        match &self.scheme {
            None => {
                if parts.len() != 1 {
                    return Err(self.malformed());
                }
                Ok(parts[0])
            }
            Some(scheme) => {
                // Scheme word match is exact and case-sensitive.
                if parts.len() != 2 || parts[0] != scheme {
                    return Err(self.malformed());
                }
                Ok(parts[1])
            }
        }
    }

    fn missing(&self) -> AuthError {
        AuthError::MissingHeader {
            header_name: self.name.as_str().to_string(),
        }
    }

    fn malformed(&self) -> AuthError {
        let expected = match &self.scheme {
            None => "<token>".to_string(),
            Some(scheme) => format!("{scheme} <token>"),
        };
        AuthError::MalformedHeader {
            header_name: self.name.as_str().to_string(),
            expected,
        }
    }
}
