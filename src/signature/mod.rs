use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;

pub type SignatureId = TypedId<Signature>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Signature {
    #[serde(rename = "_id")]
    pub id: SignatureId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub signature_comment: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Signature {
    fn tag() -> &'static str {
        "SIG"
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSignature {
    pub campaign_id: CampaignId,
    pub name: String,
    pub signature_comment: String,
}
