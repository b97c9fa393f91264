/*
 * Responsibility
 * - v1 URL structure
 * - Decides which guard covers which sub-router:
 *   /health is open, /users creation runs behind the optional guard,
 *   everything under /users/me requires a live session
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    users::{create_user, get_me},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new().route("/health", get(health));

    let creation = Router::new().route("/users", post(create_user));
    let creation = middleware::auth::access::apply_optional(creation, state.clone());

    let protected = Router::new().route("/users/me", get(get_me));
    let protected = middleware::auth::access::apply(protected, state);

    open.merge(creation).merge(protected)
}
