use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson;
use mongodb::error::{Error as DatabaseError, ErrorKind, WriteError, WriteFailure};

use crate::database::MongoUserStore;
use crate::error::Error;

use super::{User, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), Error>;

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Overwrites the profile fields of exactly one user, returning `false` if
    /// there is no user with `user_id`.
    async fn update_user_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<bool, Error>;
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        self.insert_one(user, None)
            .await
            .map_err(|err| email_conflict(err, &user.email))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let user: Option<User> = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user: Option<User> = self.find_one(bson::doc! { "email": email }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_user_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<bool, Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        let result = self
            .update_one(
                bson::doc! { "_id": user_id },
                bson::doc! { "$set": {
                    "last_name": update.last_name.as_str(),
                    "first_name": update.first_name.as_str(),
                    "email": update.email.as_str(),
                    "password_hash": update.password_hash.as_str(),
                    "modified_at": now,
                } },
                None,
            )
            .await
            .map_err(|err| email_conflict(err, &update.email))?;

        Ok(result.matched_count == 1)
    }
}

const DUPLICATE_KEY: i32 = 11000;

// a write rejected by the unique email index
fn email_conflict(err: DatabaseError, email: &str) -> Error {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        })) => Error::EmailAlreadyRegistered {
            email: email.to_string(),
        },
        _ => err.into(),
    }
}
