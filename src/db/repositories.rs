//! User directory: CRUD over the `users` table plus the row-locked
//! transactional variants used by update, delete, and registration.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

use super::DbPool;

const USER_COLUMNS: &str = "id, login, password_hash, name, gender, birthday, admin, \
     created_on, created_by, modified_on, modified_by, revoked_on, revoked_by";

pub async fn user_create(pool: &DbPool, user: &User) -> AppResult<User> {
    let row = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, login, password_hash, name, gender, birthday, admin, created_by, modified_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(user.id)
    .bind(&user.login)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.gender)
    .bind(user.birthday)
    .bind(user.admin)
    .bind(&user.created_by)
    .bind(&user.modified_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Insert inside an already-open transaction (registration path).
pub async fn user_create_tx(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, login, password_hash, name, gender, birthday, admin, created_by, modified_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(user.id)
    .bind(&user.login)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.gender)
    .bind(user.birthday)
    .bind(user.admin)
    .bind(&user.created_by)
    .bind(&user.modified_by)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn user_get_by_id(pool: &DbPool, id: Uuid) -> AppResult<User> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| AppError::not_found("User", "id", id.to_string()))
}

pub async fn user_get_by_login(pool: &DbPool, login: &str) -> AppResult<User> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE login = $1"
    ))
    .bind(login)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| AppError::not_found("User", "login", login))
}

pub async fn user_get_all(pool: &DbPool) -> AppResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_on"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Advisory existence check; the authoritative one runs in the registration
/// transaction via [`user_exists_by_login_tx`].
pub async fn user_exists_by_login(pool: &DbPool, login: &str) -> AppResult<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)")
            .bind(login)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn user_exists_by_login_tx(
    tx: &mut Transaction<'_, Postgres>,
    login: &str,
) -> AppResult<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)")
            .bind(login)
            .fetch_one(&mut **tx)
            .await?;
    Ok(exists)
}

pub async fn user_has_admin(pool: &DbPool) -> AppResult<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE admin = true)")
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Update under a row-level exclusive lock: lock the target row, copy the
/// mutable fields (name, login, password hash, gender, admin) onto it, write
/// back. Two concurrent updaters serialize on the lock, so the loser starts
/// from the winner's committed row instead of clobbering it.
pub async fn user_update_locked(pool: &DbPool, user: &User) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
    ))
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?;

    let mut locked =
        locked.ok_or_else(|| AppError::not_found("User", "id", user.id.to_string()))?;

    locked.name = user.name.clone();
    locked.login = user.login.clone();
    locked.password_hash = user.password_hash.clone();
    locked.gender = user.gender;
    locked.admin = user.admin;

    sqlx::query(
        r#"
        UPDATE users
        SET name = $1, login = $2, password_hash = $3, gender = $4, admin = $5,
            modified_on = now(), modified_by = $6
        WHERE id = $7
        "#,
    )
    .bind(&locked.name)
    .bind(&locked.login)
    .bind(&locked.password_hash)
    .bind(locked.gender)
    .bind(locked.admin)
    .bind(&user.modified_by)
    .bind(locked.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Delete under a row lock; a missing row is `not-found`, never a silent success.
pub async fn user_delete_locked(pool: &DbPool, id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    if locked.is_none() {
        return Err(AppError::not_found("User", "id", id.to_string()));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
