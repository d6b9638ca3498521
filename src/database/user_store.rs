use crate::{
    database::{MongoDB, COUNTERS_COLLECTION, STAMPS_COLLECTION, USERS_COLLECTION},
    models::{CouponId, NewUser, Role, StampAward, User, UserId},
    services::user_store::UserStore,
    utils::AppError,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection,
};
use serde::{Deserialize, Serialize};

const USER_ID_SEQUENCE: &str = "user_id";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: i64,
    social_email: String,
    nickname: String,
    cp_point: i64,
    role: Role,
    #[serde(default)]
    coupons: Vec<i64>,
}

impl UserDocument {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id().value(),
            social_email: user.social_email().to_string(),
            nickname: user.nickname().to_string(),
            cp_point: user.cp_point(),
            role: user.role(),
            coupons: user.coupons().iter().map(|c| c.0).collect(),
        }
    }

    fn into_user(self) -> Result<User, AppError> {
        let id = UserId::new(self.id)
            .ok_or_else(|| AppError::DatabaseError(format!("stored user has invalid id {}", self.id)))?;

        User::restore(
            id,
            self.social_email,
            self.nickname,
            self.cp_point,
            self.role,
            self.coupons.into_iter().map(CouponId).collect(),
        )
        .map_err(|e| AppError::DatabaseError(format!("stored user {} is invalid: {}", id, e)))
    }
}

#[derive(Debug, Deserialize)]
struct StampDocument {
    user_id: i64,
    category: String,
    earned_at: BsonDateTime,
}

#[derive(Debug, Deserialize)]
struct CounterDocument {
    seq: i64,
}

/// `UserStore` over the `users`, `stamps` and `counters` collections.
pub struct MongoUserStore {
    users: Collection<UserDocument>,
    stamps: Collection<StampDocument>,
    counters: Collection<CounterDocument>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
            stamps: db.collection(STAMPS_COLLECTION),
            counters: db.collection(COUNTERS_COLLECTION),
        }
    }

    async fn next_user_id(&self) -> Result<UserId, AppError> {
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": USER_ID_SEQUENCE }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::DatabaseError("user id counter missing after upsert".to_string()))?;

        UserId::new(counter.seq)
            .ok_or_else(|| AppError::DatabaseError(format!("invalid user id sequence value {}", counter.seq)))
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        self.users
            .find_one(doc! { "_id": id.value() })
            .await?
            .map(UserDocument::into_user)
            .transpose()
    }

    async fn find_by_social_email(&self, social_email: &str) -> Result<Option<User>, AppError> {
        self.users
            .find_one(doc! { "social_email": social_email })
            .await?
            .map(UserDocument::into_user)
            .transpose()
    }

    async fn find_stamps(&self, id: UserId) -> Result<Vec<StampAward>, AppError> {
        let documents: Vec<StampDocument> = self
            .stamps
            .find(doc! { "user_id": id.value() })
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|d| {
                let earned_at = chrono::DateTime::from_timestamp_millis(d.earned_at.timestamp_millis())
                    .ok_or_else(|| AppError::DatabaseError(format!("stamp for user {} has invalid date", d.user_id)))?;
                Ok(StampAward { user_id: id, category: d.category, earned_at })
            })
            .collect()
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        if self.find_by_social_email(user.social_email()).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "social email already registered: {}",
                user.social_email()
            )));
        }

        let id = self.next_user_id().await?;
        let user = user.into_user(id);

        match self.users.insert_one(UserDocument::from_user(&user)).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "social email already registered: {}",
                user.social_email()
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_round_trip_keeps_fields() {
        let user = NewUser::standard("a@b", "n", 12, vec![CouponId(4)])
            .unwrap()
            .into_user(UserId::new(3).unwrap());

        let restored = UserDocument::from_user(&user).into_user().unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn test_invalid_stored_user_is_a_database_error() {
        let document = UserDocument {
            id: 1,
            social_email: "a@b".into(),
            nickname: "n".into(),
            cp_point: -5,
            role: Role::User,
            coupons: vec![],
        };
        assert!(matches!(document.into_user(), Err(AppError::DatabaseError(_))));
    }

    #[test]
    fn test_role_stored_as_upper_case() {
        let user = NewUser::owner("o@k", "owner", 0).unwrap().into_user(UserId::new(2).unwrap());
        let bson = mongodb::bson::to_document(&UserDocument::from_user(&user)).unwrap();
        assert_eq!(bson.get_str("role").unwrap(), "OWNER");
        assert_eq!(bson.get_i64("_id").unwrap(), 2);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_insert_then_find() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").unwrap();
        let db = MongoDB::new(&uri).await.unwrap();
        let store = MongoUserStore::new(&db);

        let email = format!("{}@test", uuid::Uuid::new_v4());
        let created = store.insert(NewUser::standard(email.as_str(), "n", 0, vec![]).unwrap()).await.unwrap();
        let found = store.find_by_id(created.id()).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert!(matches!(
            store.insert(NewUser::admin(email.as_str(), "n", 0).unwrap()).await,
            Err(AppError::Conflict(_))
        ));
    }
}
