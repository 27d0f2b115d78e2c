use chrono::Utc;
use mongodb::Client;

use sigcolle::database::{Database, MongoDatabase};
use sigcolle::error::Error;
use sigcolle::user::{hash_password, User, UserId};

fn user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        last_name: "Yamada".to_string(),
        first_name: "Hanako".to_string(),
        email: email.to_string(),
        password_hash: hash_password("secret").unwrap(),
        created_at: now,
        modified_at: now,
    }
}

// needs a local mongodb; the database is dropped first
#[tokio::test]
#[ignore]
async fn second_insert_of_an_email_is_a_conflict() {
    let db = Client::with_uri_str("mongodb://localhost:27017")
        .await
        .unwrap()
        .database("sigcolle_users_test");
    let db = MongoDatabase::initialize(db).await.unwrap();
    db.drop().await.unwrap();

    db.users()
        .insert_user(&user("hanako@example.com"))
        .await
        .unwrap();
    let result = db.users().insert_user(&user("hanako@example.com")).await;

    assert_eq!(
        result,
        Err(Error::EmailAlreadyRegistered {
            email: "hanako@example.com".to_string()
        })
    );
}
