//! CORS policy for browser clients.
//!
//! Responsibility:
//! - Provide one consistent CORS policy for this API, applied at the Router
//!   level (not inside handlers).
//!
//! Policy:
//! - Development: permissive (Allow-Origin: *), WITHOUT credentials.
//! - Production: allowlist origins from Config (comma-separated env var),
//!   WITHOUT credentials.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

/// Apply the CORS policy to the given Router.
///
/// Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    let cors = if config.app_env.is_production() {
        // Production: allow only configured origins (exact match). An empty
        // allowlist intentionally allows none.
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new().allow_origin(allow_origin)
    } else {
        // Development: permissive (no credentials)
        CorsLayer::new().allow_origin(Any)
    }
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([
        // The token header is configurable, so the allowlist follows it.
        HeaderName::from_bytes(config.auth_header_name.as_bytes())
            .unwrap_or(header::AUTHORIZATION),
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}
