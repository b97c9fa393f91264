/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use tracing::error;

use crate::config::{Config, SessionBackend};
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::services::auth::header::HeaderPolicy;
use crate::services::auth::token::TokenCodec;
use crate::services::session::{InMemorySessionStore, SessionStore, ValkeySessionStore};

pub async fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let codec = TokenCodec::new(
        &config.jwt_secret,
        config.access_token_ttl_seconds,
        config.access_token_leeway_seconds,
    );

    let header = HeaderPolicy::new(&config.auth_header_name, config.auth_header_type.as_deref())
        .map_err(|e| {
            error!(error = %e, "invalid AUTH_HEADER_NAME");
            AppError::Internal
        })?;

    let sessions: Arc<dyn SessionStore> = match config.session_store {
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
        SessionBackend::Valkey => {
            // Config::from_env already requires REDIS_URL for this backend.
            let url = config.redis_url.as_deref().ok_or(AppError::Internal)?;
            let store = ValkeySessionStore::new(url, config.session_ttl_seconds)
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to connect the valkey session store");
                    AppError::Internal
                })?;
            Arc::new(store)
        }
    };

    Ok(Arc::new(AuthService::new(codec, header, sessions)))
}
