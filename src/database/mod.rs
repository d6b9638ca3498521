pub mod user_store;

pub use user_store::MongoUserStore;

use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";
pub const STAMPS_COLLECTION: &str = "stamps";
pub const COUNTERS_COLLECTION: &str = "counters";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("clearplate");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the user store relies on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // users(social_email) must be unique: it is the identity-provider reference
        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);
        let email_index = IndexModel::builder()
            .keys(doc! { "social_email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(social_email) unique");

        let stamps = self.collection::<mongodb::bson::Document>(STAMPS_COLLECTION);
        let stamps_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .build();

        stamps.create_index(stamps_index).await?;
        log::info!("   ✅ Index ready: stamps(user_id)");

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
