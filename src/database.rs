use async_trait::async_trait;
use mongodb::{bson, Collection};

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;
use crate::signature::db::SignatureStore;
use crate::signature::Signature;
use crate::user::db::UserStore;
use crate::user::User;

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoSignatureStore = Collection<Signature>;
pub type MongoUserStore = Collection<User>;

const CAMPAIGNS: &str = "campaigns";
const SIGNATURES: &str = "signatures";
const USERS: &str = "users";

#[async_trait]
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;

    fn signatures(&self) -> &dyn SignatureStore;

    fn users(&self) -> &dyn UserStore;

    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    signatures: MongoSignatureStore,
    users: MongoUserStore,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        create_indexes(&db).await?;

        Ok(MongoDatabase {
            campaigns: db.collection(CAMPAIGNS),
            signatures: db.collection(SIGNATURES),
            users: db.collection(USERS),
            db,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn signatures(&self) -> &dyn SignatureStore {
        &self.signatures
    }

    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;
        create_indexes(&self.db).await?;

        Ok(())
    }
}

async fn create_indexes(db: &mongodb::Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CAMPAIGNS,
            "indexes": [
                { "key": { "create_user_id": 1, "created_at": -1 }, "name": "by_create_user_id" },
            ]
        },
        None,
    )
    .await?;

    db.run_command(
        bson::doc! {
            "createIndexes": SIGNATURES,
            "indexes": [
                { "key": { "campaign_id": 1, "created_at": 1 }, "name": "by_campaign_id" },
            ]
        },
        None,
    )
    .await?;

    db.run_command(
        bson::doc! {
            "createIndexes": USERS,
            "indexes": [
                { "key": { "email": 1 }, "name": "by_email", "unique": true },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}
