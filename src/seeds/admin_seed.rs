use crate::config::SeedAdmin;
use crate::models::{NewUser, Role, User};
use crate::services::UserService;
use crate::utils::AppError;

/// Creates the configured admin user unless one already exists.
/// An existing user with the same social email is returned untouched.
pub async fn seed_admin_user(service: &UserService, seed: &SeedAdmin) -> Result<User, AppError> {
    if let Some(existing) = service.find_by_social_email(&seed.social_email).await? {
        if existing.role() != Role::Admin {
            log::warn!(
                "⚠️  Seed admin {} already exists with role {}, leaving it untouched",
                seed.social_email,
                existing.role()
            );
        } else {
            log::info!("👑 Admin user {} already exists, skipping seed", existing.id());
        }
        return Ok(existing);
    }

    log::info!("👑 Seeding admin user {}...", seed.social_email);
    let admin = NewUser::admin(seed.social_email.as_str(), seed.nickname.as_str(), 0)?;
    service.register(admin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryUserStore, SessionIdentityResolver};
    use std::sync::Arc;

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(SessionIdentityResolver),
            Arc::new(SessionIdentityResolver),
        )
    }

    fn seed() -> SeedAdmin {
        SeedAdmin { social_email: "admin@kakao".to_string(), nickname: "admin".to_string() }
    }

    #[tokio::test]
    async fn test_seed_creates_admin_once() {
        let service = service();

        let first = seed_admin_user(&service, &seed()).await.unwrap();
        let second = seed_admin_user(&service, &seed()).await.unwrap();

        assert_eq!(first.role(), Role::Admin);
        assert!(first.coupons().is_empty());
        assert_eq!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_seed_rejects_long_nickname() {
        let service = service();
        let seed = SeedAdmin { social_email: "admin@kakao".into(), nickname: "administrator".into() };

        assert!(matches!(seed_admin_user(&service, &seed).await, Err(AppError::InvalidRequest(_))));
    }
}
