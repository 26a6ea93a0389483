//! InMemory User Repository 実装
//!
//! ドメイン層が定義する UserRepository trait の具体的な実装。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Principal, RepositoryError, UserId, UserRepository};

/// インメモリ User Repository 実装
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, Principal>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with `users`.
    ///
    /// Later entries with a duplicate id replace earlier ones.
    pub fn with_users(users: impl IntoIterator<Item = Principal>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, user_id: UserId) -> Result<Principal, RepositoryError> {
        let users = self.users.lock().await;
        users
            .get(&user_id)
            .cloned()
            .ok_or(RepositoryError::UserNotFound(user_id))
    }

    async fn add_user(&self, user: Principal) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::UserAlreadyExists(user.id));
        }
        users.insert(user.id, user);
        Ok(())
    }
}
