/*
 * Responsibility
 * - tokio runtime entry
 * - app::run() call (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    user_api::app::run().await
}
