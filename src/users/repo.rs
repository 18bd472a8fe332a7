use async_trait::async_trait;
use sqlx::PgPool;

use super::error::{UserError, UserResult};
use super::repo_types::{NewUser, User, UserChanges};
use super::validation::{taken, ValidationErrors};

/// Data access for the `users` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in id order.
    async fn find_all(&self) -> UserResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Inserts a row. A duplicate email fails as an `email` validation error.
    async fn insert(&self, user: NewUser) -> UserResult<User>;

    /// Overwrites name/email and, when given, the password hash.
    /// Returns `None` if the row no longer exists.
    async fn update(&self, id: i64, changes: UserChanges) -> UserResult<Option<User>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> UserResult<bool>;
}

const USER_COLUMNS: &str =
    "id, name, email, email_verified_at, password, remember_token, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// The unique index on `email` is the source of truth; the service's
/// pre-check only makes the common case friendlier.
fn map_write_error(e: sqlx::Error) -> UserError {
    let unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        UserError::Validation(ValidationErrors::single("email", taken("email")))
    } else {
        UserError::Database(e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> UserResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password, email_verified_at, remember_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.email_verified_at)
        .bind(&user.remember_token)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                password = COALESCE($4, password),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
