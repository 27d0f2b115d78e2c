use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub title: String,
    /// Sanitized html, rendered from markdown once when the campaign is created.
    pub statement: String,
    pub goal: i64,
    pub create_user_id: UserId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// A validated request to start a campaign. The statement is still markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCampaign {
    pub title: String,
    pub statement: String,
    pub goal: Goal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Goal {
    Parsed(i64),
    Defaulted { submitted: String },
}

impl Goal {
    pub fn parse(submitted: &str) -> Goal {
        match submitted.trim().parse::<i64>() {
            Ok(goal) if goal >= 0 => Goal::Parsed(goal),
            _ => Goal::Defaulted {
                submitted: submitted.to_string(),
            },
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            Goal::Parsed(goal) => *goal,
            Goal::Defaulted { .. } => 0,
        }
    }
}
