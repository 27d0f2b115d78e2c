use chrono::{Duration, Utc};
use tracing::info;

use crate::campaign::{Campaign, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::markdown::render_markdown;
use crate::signature::{Signature, SignatureId};
use crate::user::{hash_password, User, UserId};

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "sigcolle";

const STATEMENT: &str = "\
The branch library on Hill Street is scheduled to close at the end of the year.

We ask the city council to:

1. keep the **reading room** open on weekdays
2. keep the children's section staffed
3. publish the budget that led to the closure

| Visitors | 2022 | 2023 |
|----------|------|------|
| Adults   | 8120 | 8544 |
| Children | 3310 | 3902 |
";

pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.drop().await?;

    let now = Utc::now();
    let owner = User {
        id: UserId::new(),
        last_name: "Demo".to_string(),
        first_name: "User".to_string(),
        email: DEMO_EMAIL.to_string(),
        password_hash: hash_password(DEMO_PASSWORD)?,
        created_at: now,
        modified_at: now,
    };

    let campaigns = vec![
        Campaign {
            id: CampaignId::new(),
            title: "Keep the Hill Street library open".to_string(),
            statement: render_markdown(STATEMENT),
            goal: 500,
            create_user_id: owner.id,
            created_at: now - Duration::days(3),
        },
        Campaign {
            id: CampaignId::new(),
            title: "A crossing light at the school gate".to_string(),
            statement: render_markdown("Cars *do not stop* at the east gate. We need a light."),
            goal: 100,
            create_user_id: owner.id,
            created_at: now - Duration::days(1),
        },
    ];

    let signatures = vec![
        ("Yamada Hanako", "I study there every weekend."),
        ("Suzuki Ichiro", ""),
        ("Tanaka Kei", "My kids love the story hour."),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, comment))| Signature {
        id: SignatureId::new(),
        campaign_id: campaigns[0].id,
        name: name.to_string(),
        signature_comment: comment.to_string(),
        created_at: now - Duration::hours(i as i64),
    })
    .collect::<Vec<_>>();

    db.users().insert_user(&owner).await?;
    for campaign in &campaigns {
        db.campaigns().insert_campaign(campaign).await?;
    }
    for signature in &signatures {
        db.signatures().insert_signature(signature).await?;
    }

    info!(
        "seeded {} campaigns and {} signatures, log in as {}",
        campaigns.len(),
        signatures.len(),
        DEMO_EMAIL
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use crate::user::verify_password;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn seeds_a_demo_user_who_owns_every_campaign() {
        let mut db = MockDatabase::new();
        let users = Arc::new(Mutex::new(vec![]));
        let campaigns = Arc::new(Mutex::new(vec![]));
        let signatures = Arc::new(Mutex::new(vec![]));

        let users_clone = Arc::clone(&users);
        db.users.on_insert_user = Box::new(move |user| {
            users_clone.lock().unwrap().push(user);
            Ok(())
        });
        let campaigns_clone = Arc::clone(&campaigns);
        db.campaigns.on_insert_campaign = Box::new(move |campaign| {
            campaigns_clone.lock().unwrap().push(campaign);
            Ok(())
        });
        let signatures_clone = Arc::clone(&signatures);
        db.signatures.on_insert_signature = Box::new(move |signature| {
            signatures_clone.lock().unwrap().push(signature);
            Ok(())
        });

        seed(&db).await.unwrap();

        let users: Vec<User> = users.lock().unwrap().clone();
        let campaigns: Vec<Campaign> = campaigns.lock().unwrap().clone();
        let signatures: Vec<Signature> = signatures.lock().unwrap().clone();
        assert_eq!(users.len(), 1);
        assert!(verify_password(DEMO_PASSWORD, &users[0].password_hash).unwrap());
        assert!(!campaigns.is_empty());
        assert!(campaigns.iter().all(|c| c.create_user_id == users[0].id));
        assert!(signatures
            .iter()
            .all(|s| campaigns.iter().any(|c| c.id == s.campaign_id)));
    }
}
