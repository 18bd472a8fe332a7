use std::sync::Arc;

use tracing::{debug, info};

use super::dto::UserPayload;
use super::error::{UserError, UserResult};
use super::password::hash_password;
use super::repo::UserRepository;
use super::repo_types::{NewUser, User, UserChanges};
use super::validation::{checked_email, validate_create, validate_update};

/// The five user operations over an injected repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &dyn UserRepository {
        self.repo.as_ref()
    }

    pub async fn list(&self) -> UserResult<Vec<User>> {
        self.repo.find_all().await
    }

    pub async fn get(&self, id: i64) -> UserResult<User> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)
    }

    pub async fn create(&self, payload: &UserPayload) -> UserResult<User> {
        let taken = self.email_taken(payload, None).await?;
        let input = validate_create(payload, taken)?;

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repo
            .insert(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                email_verified_at: None,
                remember_token: None,
            })
            .await?;

        info!(user_id = user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Looks the user up before validating, so a missing id is a 404 even
    /// when the payload is also invalid.
    pub async fn update(&self, id: i64, payload: &UserPayload) -> UserResult<User> {
        let current = self.get(id).await?;

        let taken = self.email_taken(payload, Some(current.id)).await?;
        let input = validate_update(payload, taken)?;

        let password_hash = match input.password.as_deref() {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let user = self
            .repo
            .update(
                current.id,
                UserChanges {
                    name: input.name,
                    email: input.email,
                    password_hash,
                },
            )
            .await?
            .ok_or(UserError::NotFound)?;

        info!(user_id = user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> UserResult<()> {
        let user = self.get(id).await?;
        if !self.repo.delete(user.id).await? {
            return Err(UserError::NotFound);
        }
        info!(user_id = user.id, "user deleted");
        Ok(())
    }

    /// Whether the payload's email belongs to a user other than `except`.
    async fn email_taken(&self, payload: &UserPayload, except: Option<i64>) -> UserResult<bool> {
        let Some(email) = checked_email(payload) else {
            return Ok(false);
        };
        let taken = match self.repo.find_by_email(&email).await? {
            Some(existing) => Some(existing.id) != except,
            None => false,
        };
        debug!(%email, taken, "email uniqueness checked");
        Ok(taken)
    }
}
