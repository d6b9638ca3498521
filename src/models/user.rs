use crate::utils::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NICKNAME_MAX_CHARS: usize = 10;

/// Store-assigned user identifier. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|e| format!("invalid user id '{}': {}", s, e))?;
        UserId::new(raw).ok_or_else(|| format!("user id must be positive, got {}", raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Owner,
    Admin,
}

impl Role {
    /// Coupons are an end-user feature; owners and admins never hold them.
    pub fn can_hold_coupons(self) -> bool {
        matches!(self, Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Owner => write!(f, "OWNER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// A validated user that has not been persisted yet.
///
/// Only the three role factories can build one, so every `NewUser` already
/// satisfies the nickname, point and coupon rules.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    social_email: String,
    nickname: String,
    cp_point: i64,
    role: Role,
    coupons: Vec<CouponId>,
}

impl NewUser {
    /// Regular end user, the only role allowed to start with coupons.
    // Sign-up lives in the login flow; this service only seeds admins.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn standard(
        social_email: impl Into<String>,
        nickname: impl Into<String>,
        cp_point: i64,
        coupons: Vec<CouponId>,
    ) -> Result<Self, AppError> {
        Self::validated(social_email.into(), nickname.into(), cp_point, Role::User, coupons)
    }

    /// Restaurant owner account.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn owner(
        social_email: impl Into<String>,
        nickname: impl Into<String>,
        cp_point: i64,
    ) -> Result<Self, AppError> {
        Self::validated(social_email.into(), nickname.into(), cp_point, Role::Owner, Vec::new())
    }

    /// Administrator account.
    pub fn admin(
        social_email: impl Into<String>,
        nickname: impl Into<String>,
        cp_point: i64,
    ) -> Result<Self, AppError> {
        Self::validated(social_email.into(), nickname.into(), cp_point, Role::Admin, Vec::new())
    }

    fn validated(
        social_email: String,
        nickname: String,
        cp_point: i64,
        role: Role,
        coupons: Vec<CouponId>,
    ) -> Result<Self, AppError> {
        validate_fields(&social_email, &nickname, cp_point)?;
        if !role.can_hold_coupons() && !coupons.is_empty() {
            return Err(AppError::InvalidRequest(format!("{} users cannot hold coupons", role)));
        }

        Ok(Self { social_email, nickname, cp_point, role, coupons })
    }

    pub fn social_email(&self) -> &str {
        &self.social_email
    }

    /// Attach the store-assigned id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            social_email: self.social_email,
            nickname: self.nickname,
            cp_point: self.cp_point,
            role: self.role,
            coupons: self.coupons,
        }
    }
}

fn validate_fields(social_email: &str, nickname: &str, cp_point: i64) -> Result<(), AppError> {
    if social_email.trim().is_empty() {
        return Err(AppError::InvalidRequest("social email is required".to_string()));
    }
    if nickname.trim().is_empty() {
        return Err(AppError::InvalidRequest("nickname is required".to_string()));
    }
    if nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(AppError::InvalidRequest(format!(
            "nickname must be at most {} characters",
            NICKNAME_MAX_CHARS
        )));
    }
    if cp_point < 0 {
        return Err(AppError::InvalidRequest("cp point cannot be negative".to_string()));
    }
    Ok(())
}

/// Persisted user aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    social_email: String,
    nickname: String,
    cp_point: i64,
    role: Role,
    coupons: Vec<CouponId>,
}

impl User {
    /// Rebuild a user read back from storage, re-checking the field rules.
    pub fn restore(
        id: UserId,
        social_email: String,
        nickname: String,
        cp_point: i64,
        role: Role,
        coupons: Vec<CouponId>,
    ) -> Result<Self, AppError> {
        let new_user = NewUser::validated(social_email, nickname, cp_point, role, coupons)?;
        Ok(new_user.into_user(id))
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn social_email(&self) -> &str {
        &self.social_email
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn cp_point(&self) -> i64 {
        self.cp_point
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn coupons(&self) -> &[CouponId] {
        &self.coupons
    }
}

/// Public view of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "4321933402@kakao")]
    pub social_email: String,
    pub nickname: String,
    #[schema(example = 0)]
    pub cp_point: i64,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            social_email: user.social_email.clone(),
            nickname: user.nickname.clone(),
            cp_point: user.cp_point,
        }
    }
}
