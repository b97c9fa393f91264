/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Provide the per-request authenticated context (AuthCtx) to handlers
 * - HTTP/axum wiring stays in core, the type contract in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 * - MaybeAuthCtx
 */

mod core;
mod types;

pub use core::{AuthCtxExtractor, MaybeAuthCtx};
pub use types::AuthCtx;
