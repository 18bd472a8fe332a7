use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::error::{UserError, UserResult};
use super::repo::UserRepository;
use super::repo_types::{NewUser, User, UserChanges};
use super::validation::{taken, ValidationErrors};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

/// `UserRepository` backed by a map, with the same unique-email rule as the
/// database (exact, case-sensitive match). Used by tests and local runs
/// without PostgreSQL.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> UserError {
    UserError::Validation(ValidationErrors::single("email", taken("email")))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> UserResult<User> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }

        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: table.next_id,
            name: user.name,
            email: user.email,
            email_verified_at: user.email_verified_at,
            password: user.password_hash,
            remember_token: user.remember_token,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> UserResult<Option<User>> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|u| u.id != id && u.email == changes.email)
        {
            return Err(duplicate_email());
        }

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.name = changes.name;
        row.email = changes.email;
        if let Some(hash) = changes.password_hash {
            row.password = hash;
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}
