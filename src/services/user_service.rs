use crate::{
    models::{NewUser, StampSummary, User, UserId, UserProfile},
    services::{identity_service::IdentityResolver, user_store::UserStore},
    utils::AppError,
};
use actix_web::HttpRequest;
use std::sync::Arc;

pub const NO_LOGIN_USER_MESSAGE: &str = "no logged-in user";

/// Builds the user read models from a resolved identity.
pub struct UserService {
    store: Arc<dyn UserStore>,
    login_resolver: Arc<dyn IdentityResolver>,
    token_resolver: Arc<dyn IdentityResolver>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        login_resolver: Arc<dyn IdentityResolver>,
        token_resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self { store, login_resolver, token_resolver }
    }

    /// Profile of the user attached to the request's login session.
    pub async fn get_login_user(&self, req: &HttpRequest) -> Result<UserProfile, AppError> {
        let user_id = self.login_resolver.resolve_user_id(req).map_err(|e| {
            log::warn!("⚠️  Login user not resolved: {}", e);
            AppError::Unauthenticated(NO_LOGIN_USER_MESSAGE.to_string())
        })?;

        match self.store.find_by_id(user_id).await? {
            Some(user) => Ok(UserProfile::from(&user)),
            None => {
                log::warn!("⚠️  Session names user {} but no record exists", user_id);
                Err(AppError::Unauthenticated(NO_LOGIN_USER_MESSAGE.to_string()))
            }
        }
    }

    /// User id carried by the request's refresh token.
    pub fn resolve_token_user(&self, req: &HttpRequest) -> Result<UserId, AppError> {
        self.token_resolver.resolve_user_id(req).map_err(|e| {
            log::warn!("⚠️  Refresh token not resolved: {}", e);
            AppError::from(e)
        })
    }

    pub async fn get_user_point(&self, user_id: UserId) -> Result<i64, AppError> {
        let user = self.load(user_id).await?;
        Ok(user.cp_point())
    }

    pub async fn get_user_stamps(&self, user_id: UserId) -> Result<StampSummary, AppError> {
        let user = self.load(user_id).await?;
        let awards = self.store.find_stamps(user.id()).await?;
        log::debug!("🎫 User {} has {} stamp awards", user_id, awards.len());

        Ok(StampSummary::from_awards(user.id(), &awards))
    }

    pub async fn register(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = self.store.insert(new_user).await?;
        log::info!("✅ User {} registered with role {}", user.id(), user.role());
        Ok(user)
    }

    pub async fn find_by_social_email(&self, social_email: &str) -> Result<Option<User>, AppError> {
        self.store.find_by_social_email(social_email).await
    }

    async fn load(&self, user_id: UserId) -> Result<User, AppError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user not found: {}", user_id)))
    }
}
