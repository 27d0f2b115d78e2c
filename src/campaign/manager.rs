use chrono::Utc;
use tracing::warn;

use crate::database::Database;
use crate::error::Error;
use crate::markdown::render_markdown;
use crate::signature::{NewSignature, Signature, SignatureId};
use crate::user::{Principal, User};

use super::{Campaign, CampaignId, Goal, NewCampaign};

/// Everything the campaign page shows.
#[derive(Clone, Debug)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    pub owner: User,
    pub signature_count: u64,
    pub comments: Vec<String>,
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_detail(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<CampaignDetail, Error> {
    let campaign = db.campaigns().assert_campaign_exists(campaign_id).await?;

    let owner = db
        .users()
        .fetch_user_by_id(campaign.create_user_id)
        .await?
        .ok_or(Error::UserNotFound {
            user_id: campaign.create_user_id,
        })?;

    let comments = db
        .signatures()
        .fetch_signatures_by_campaign(campaign.id)
        .await?
        .into_iter()
        .map(|signature| signature.signature_comment)
        .collect();

    let signature_count = db
        .signatures()
        .count_signatures_by_campaign(campaign.id)
        .await?;

    Ok(CampaignDetail {
        campaign,
        owner,
        signature_count,
        comments,
    })
}

#[tracing::instrument(skip(db))]
pub async fn sign_campaign(
    db: &dyn Database,
    new_signature: NewSignature,
) -> Result<Signature, Error> {
    let campaign = db
        .campaigns()
        .assert_campaign_exists(new_signature.campaign_id)
        .await?;

    let signature = Signature {
        id: SignatureId::new(),
        campaign_id: campaign.id,
        name: new_signature.name,
        signature_comment: new_signature.signature_comment,
        created_at: Utc::now(),
    };

    db.signatures().insert_signature(&signature).await?;

    Ok(signature)
}

#[tracing::instrument(skip(db, new_campaign), fields(title = %new_campaign.title))]
pub async fn create_campaign(
    db: &dyn Database,
    principal: &Principal,
    new_campaign: NewCampaign,
) -> Result<Campaign, Error> {
    if let Goal::Defaulted { submitted } = &new_campaign.goal {
        warn!("goal {:?} is not a non-negative integer, using 0", submitted);
    }

    let campaign = Campaign {
        id: CampaignId::new(),
        title: new_campaign.title,
        statement: render_markdown(&new_campaign.statement),
        goal: new_campaign.goal.value(),
        create_user_id: principal.user_id,
        created_at: Utc::now(),
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<(Campaign, u64)>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    let mut counted = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let count = db
            .signatures()
            .count_signatures_by_campaign(campaign.id)
            .await?;
        counted.push((campaign, count));
    }

    Ok(counted)
}

#[tracing::instrument(skip(db))]
pub async fn get_owned_campaigns(
    db: &dyn Database,
    principal: &Principal,
) -> Result<Vec<(Campaign, u64)>, Error> {
    let campaigns = db
        .campaigns()
        .fetch_campaigns_by_create_user(principal.user_id)
        .await?;

    let mut counted = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        // never list another user's campaign
        if campaign.create_user_id != principal.user_id {
            continue;
        }

        let count = db
            .signatures()
            .count_signatures_by_campaign(campaign.id)
            .await?;
        counted.push((campaign, count));
    }

    Ok(counted)
}
