//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{GuestCreate, User, UserRole};
use sqlx::SqlitePool;

const USER_SELECT: &str =
    "SELECT id, name, email, address, phone, role, password_hash, created_at FROM users";

/// Placeholder credential for guest accounts. Not a valid hash, so it can
/// never match a password.
pub const GUEST_PASSWORD_PLACEHOLDER: &str = "!guest";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Case-insensitive (column collation is NOCASE)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a guest user. A concurrent insert with the same email surfaces as
/// [`RepoError::Duplicate`].
pub async fn create_guest(pool: &SqlitePool, data: &GuestCreate) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, name, email, address, phone, role, password_hash, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(UserRole::Guest)
    .bind(GUEST_PASSWORD_PLACEHOLDER)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}
