//! User service: orchestrates hashing, the token service, and the directory.

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::db::{
    self, user_create_tx, user_delete_locked, user_exists_by_login_tx, user_get_all,
    user_get_by_id, user_get_by_login, user_has_admin, user_update_locked, DbPool,
};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::RedisRepository;

const DEFAULT_ADMIN_LOGIN: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "Admin123";

#[derive(Clone)]
pub struct UserService {
    db: DbPool,
    redis: RedisRepository,
    tokens: TokenService,
}

impl UserService {
    pub fn new(db: DbPool, redis: RedisRepository, tokens: TokenService) -> Self {
        Self { db, redis, tokens }
    }

    /// Register a new user. The incoming record carries the plaintext password
    /// in `password_hash`; it is hashed here before anything is stored. The
    /// uniqueness re-check and the insert share one transaction, closing the
    /// window between the advisory check and the write.
    pub async fn register(&self, mut user: User) -> AppResult<()> {
        user.password_hash = hash_password(&user.password_hash)?;

        let mut tx = self.db.begin().await?;
        if user_exists_by_login_tx(&mut tx, &user.login).await? {
            return Err(AppError::Conflict {
                field: "login",
                value: user.login.clone(),
            });
        }
        user_create_tx(&mut tx, &user).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Verify credentials and issue a session token.
    pub async fn login(&self, login: &str, password: &str) -> AppResult<String> {
        let user = user_get_by_login(&self.db, login).await?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("invalid credentials".to_string()));
        }
        self.tokens.issue(user.id, user.admin, &user.login)
    }

    /// Row-locked update. The password is re-hashed unconditionally; callers
    /// always supply a usable plaintext value.
    pub async fn update(&self, mut user: User) -> AppResult<()> {
        user.password_hash = hash_password(&user.password_hash)?;
        user_update_locked(&self.db, &user).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        user_delete_locked(&self.db, id).await
    }

    /// Read all users, then refresh the cache snapshot off the request path.
    /// The cache is advisory; a failed refresh is logged and dropped.
    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        let users = user_get_all(&self.db).await?;

        let redis = self.redis.clone();
        let snapshot = users.clone();
        tokio::spawn(async move {
            if let Err(e) = redis.cache_users(&snapshot).await {
                warn!(error = %e, "users cache refresh failed");
            }
        });

        Ok(users)
    }

    pub async fn get_by_login(&self, login: &str) -> AppResult<User> {
        user_get_by_login(&self.db, login).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        user_get_by_id(&self.db, id).await
    }

    /// Idempotent bootstrap: create the default admin when no admin exists.
    /// Runs once at startup, before the server accepts traffic.
    pub async fn ensure_default_admin(&self) -> AppResult<()> {
        if user_has_admin(&self.db).await? {
            return Ok(());
        }

        let mut admin = User::new(
            Uuid::new_v4(),
            DEFAULT_ADMIN_LOGIN.to_string(),
            hash_password(DEFAULT_ADMIN_PASSWORD)?,
            "Administrator".to_string(),
            2,
            None,
            true,
        );
        admin.created_by = "system".to_string();

        db::user_create(&self.db, &admin).await?;
        info!(login = DEFAULT_ADMIN_LOGIN, "default admin created");
        Ok(())
    }
}
