use chrono::Utc;
use tracing::info;

use crate::database::Database;
use crate::error::Error;

use super::db::ProfileUpdate;
use super::{hash_password, verify_password, Principal, User, UserId, UserProfile};

#[tracing::instrument(skip(db))]
pub async fn get_user(db: &dyn Database, principal: &Principal) -> Result<User, Error> {
    let user = db
        .users()
        .fetch_user_by_id(principal.user_id)
        .await?
        .ok_or(Error::UserNotFound {
            user_id: principal.user_id,
        })?;

    Ok(user)
}

/// Overwrites the profile of the user in `principal` and returns the principal
/// that should replace it in the session.
#[tracing::instrument(skip(db, profile))]
pub async fn update_profile(
    db: &dyn Database,
    principal: &Principal,
    profile: UserProfile,
) -> Result<Principal, Error> {
    let user_id = principal.user_id;

    if let Some(other) = db.users().fetch_user_by_email(&profile.email).await? {
        if other.id != user_id {
            return Err(Error::EmailAlreadyRegistered {
                email: profile.email,
            });
        }
    }

    let update = ProfileUpdate {
        password_hash: hash_password(&profile.password)?,
        last_name: profile.last_name,
        first_name: profile.first_name,
        email: profile.email,
    };

    let updated = db.users().update_user_profile(user_id, &update).await?;
    if !updated {
        return Err(Error::UserNotFound { user_id });
    }

    Ok(Principal {
        user_id,
        display_name: format!("{} {}", update.last_name, update.first_name),
    })
}

#[tracing::instrument(skip(db, profile))]
pub async fn register_user(db: &dyn Database, profile: UserProfile) -> Result<User, Error> {
    if db
        .users()
        .fetch_user_by_email(&profile.email)
        .await?
        .is_some()
    {
        return Err(Error::EmailAlreadyRegistered {
            email: profile.email,
        });
    }

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        password_hash: hash_password(&profile.password)?,
        last_name: profile.last_name,
        first_name: profile.first_name,
        email: profile.email,
        created_at: now,
        modified_at: now,
    };

    db.users().insert_user(&user).await?;
    info!(user_id = %user.id, "registered user");

    Ok(user)
}

#[tracing::instrument(skip(db, password))]
pub async fn authenticate(db: &dyn Database, email: &str, password: &str) -> Result<Principal, Error> {
    let user = db
        .users()
        .fetch_user_by_email(email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    Ok(Principal::of(&user))
}
