use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;

pub type UserId = TypedId<User>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}

/// The fields a user may overwrite on their own record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password: String,
}

/// The logged in user, as stored in the session cookie.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub display_name: String,
}

impl Principal {
    pub const SESSION_KEY: &'static str = "principal";

    pub fn of(user: &User) -> Principal {
        Principal {
            user_id: user.id,
            display_name: user.display_name(),
        }
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Principal, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let principal = req
            .get_session()
            .get::<Principal>(Principal::SESSION_KEY)
            .map_err(Error::from)
            .and_then(|principal| principal.ok_or(Error::NotAuthenticated));

        ready(principal)
    }
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, Error> {
    let hash = PasswordHash::new(password_hash)?;
    let verified = Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok();

    Ok(verified)
}
