use rand::{distributions::Alphanumeric, thread_rng, Rng};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::error::UserResult;
use super::password::hash_password;
use super::repo::UserRepository;
use super::repo_types::NewUser;

const DEMO_PASSWORD: &str = "rahasia";

const DEMO_USERS: &[(&str, &str)] = &[
    ("John Doe", "john@example.com"),
    ("Jane Doe", "jane@example.com"),
    ("Alice Smith", "alice@example.com"),
    ("Bob Johnson", "bob@example.com"),
];

fn remember_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Inserts the demo accounts that don't exist yet. Returns how many were added.
pub async fn seed_demo_users(repo: &dyn UserRepository) -> UserResult<usize> {
    let mut inserted = 0;
    for (name, email) in DEMO_USERS {
        if repo.find_by_email(email).await?.is_some() {
            debug!(%email, "demo user already present");
            continue;
        }
        repo.insert(NewUser {
            name: (*name).to_string(),
            email: (*email).to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            email_verified_at: Some(OffsetDateTime::now_utc()),
            remember_token: Some(remember_token()),
        })
        .await?;
        inserted += 1;
    }
    info!(inserted, "demo users seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::InMemoryUserRepository;
    use crate::users::password::verify_password;

    #[tokio::test]
    async fn seeds_four_verified_users_once() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(seed_demo_users(&repo).await.unwrap(), 4);
        assert_eq!(seed_demo_users(&repo).await.unwrap(), 0);

        let users = repo.find_all().await.unwrap();
        assert_eq!(users.len(), 4);
        let jane = repo.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(jane.name, "Jane Doe");
        assert!(jane.email_verified_at.is_some());
        assert_eq!(jane.remember_token.as_deref().map(str::len), Some(10));
        assert!(verify_password(DEMO_PASSWORD, &jane.password).unwrap());
    }
}
