/*
 * Responsibility
 * - SQLx operations for the users table
 * - Takes a PgPool, returns rows in a shape the handlers can map directly
 *
 * Schema:
 *   users(id uuid pk default gen_random_uuid(),
 *         username text unique not null,
 *         password_sha256 text not null,
 *         created_at timestamptz not null default now())
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
}

pub async fn create(
    db: &PgPool,
    username: &str,
    password_sha256: &str,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, password_sha256)
        VALUES ($1, $2)
        RETURNING id, username
        "#,
    )
    .bind(username)
    .bind(password_sha256)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get_by_username(db: &PgPool, username: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn exists(db: &PgPool, username: &str) -> Result<bool, RepoError> {
    let found = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
        "#,
    )
    .bind(username)
    .fetch_one(db)
    .await?;

    Ok(found)
}
