use crate::{
    models::{NewUser, StampAward, User, UserId},
    utils::AppError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Persistence boundary for user records and their stamp awards.
///
/// A missing user is `Ok(None)`; `Err` is reserved for store failures.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn find_by_social_email(&self, social_email: &str) -> Result<Option<User>, AppError>;

    /// Stamp awards recorded for the user, in no particular order.
    async fn find_stamps(&self, id: UserId) -> Result<Vec<StampAward>, AppError>;

    /// Persist a new user, assigning the next id. Duplicate social emails are a `Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: HashMap<UserId, User>,
    stamps: Vec<StampAward>,
}

/// Map-backed store for tests and database-less local runs.
#[derive(Default)]
pub struct InMemoryUserStore {
    state: RwLock<MemoryState>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stamp award, standing in for the external award flow.
    #[cfg(test)]
    pub fn record_stamp(&self, award: StampAward) -> Result<(), AppError> {
        let mut state = self.write()?;
        state.stamps.push(award);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>, AppError> {
        self.state
            .read()
            .map_err(|e| AppError::DatabaseError(format!("store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>, AppError> {
        self.state
            .write()
            .map_err(|e| AppError::DatabaseError(format!("store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_social_email(&self, social_email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.social_email() == social_email)
            .cloned())
    }

    async fn find_stamps(&self, id: UserId) -> Result<Vec<StampAward>, AppError> {
        Ok(self
            .read()?
            .stamps
            .iter()
            .filter(|s| s.user_id == id)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.write()?;

        if state.users.values().any(|u| u.social_email() == user.social_email()) {
            return Err(AppError::Conflict(format!(
                "social email already registered: {}",
                user.social_email()
            )));
        }

        state.next_id += 1;
        let id = UserId::new(state.next_id)
            .ok_or_else(|| AppError::DatabaseError("user id sequence overflowed".to_string()))?;
        let user = user.into_user(id);
        state.users.insert(id, user.clone());

        Ok(user)
    }
}
