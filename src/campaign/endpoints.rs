use actix_session::Session;
use actix_web::web::{Data, Form, Path};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::flash::{put_flash, take_flash};
use crate::signature::NewSignature;
use crate::user::{Principal, User, UserId};
use crate::views::{self, ViewRenderer};
use crate::violations::Violations;

use super::{manager, Campaign, CampaignId, Goal, NewCampaign};

const TITLE_MAX_LENGTH: usize = 100;
const STATEMENT_MAX_LENGTH: usize = 10_000;
const NAME_MAX_LENGTH: usize = 50;
const COMMENT_MAX_LENGTH: usize = 500;

const SIGNED_MESSAGE: &str = "Thank you for your support!";
const CREATED_MESSAGE: &str = "Your campaign has been created.";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CreateCampaignForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub goal: String,
}

impl CreateCampaignForm {
    pub fn validate(&self) -> Result<NewCampaign, Violations> {
        let mut violations = Violations::new();
        violations.require("title", &self.title, TITLE_MAX_LENGTH);
        violations.require("statement", &self.statement, STATEMENT_MAX_LENGTH);

        violations.into_result(NewCampaign {
            title: self.title.clone(),
            statement: self.statement.clone(),
            goal: Goal::parse(&self.goal),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SignatureForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub signature_comment: String,
}

impl SignatureForm {
    pub fn validate(&self, campaign_id: CampaignId) -> Result<NewSignature, Violations> {
        let mut violations = Violations::new();
        violations.require("name", &self.name, NAME_MAX_LENGTH);
        violations.limit("signature_comment", &self.signature_comment, COMMENT_MAX_LENGTH);

        violations.into_result(NewSignature {
            campaign_id,
            name: self.name.clone(),
            signature_comment: self.signature_comment.clone(),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub statement: String,
    pub goal: i64,
    pub create_user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub signature_count: u64,
    pub progress: u64,
}

impl CampaignBody {
    pub fn render(campaign: Campaign, signature_count: u64) -> CampaignBody {
        let progress = if campaign.goal > 0 {
            (signature_count * 100 / campaign.goal as u64).min(100)
        } else {
            100
        };

        CampaignBody {
            id: campaign.id,
            title: campaign.title,
            statement: campaign.statement,
            goal: campaign.goal,
            create_user_id: campaign.create_user_id,
            created_at: campaign.created_at,
            signature_count,
            progress,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OwnerBody {
    pub id: UserId,
    pub display_name: String,
}

impl OwnerBody {
    pub fn render(user: User) -> OwnerBody {
        OwnerBody {
            display_name: user.display_name(),
            id: user.id,
        }
    }
}

async fn render_campaign_page(
    db: &dyn Database,
    views: &dyn ViewRenderer,
    principal: Option<&Principal>,
    campaign_id: CampaignId,
    form: &SignatureForm,
    errors: &Violations,
    message: Option<String>,
) -> Result<HttpResponse, Error> {
    let detail = manager::get_campaign_detail(db, campaign_id).await?;

    let mut context = views::context(principal);
    context.insert(
        "campaign",
        &CampaignBody::render(detail.campaign, detail.signature_count),
    );
    context.insert("user", &OwnerBody::render(detail.owner));
    context.insert("signature_count", &detail.signature_count);
    context.insert("comments", &detail.comments);
    context.insert("signature", form);
    context.insert("errors", errors);
    context.insert("message", &message);

    views::page(views, "campaign/index.html", &context)
}

#[get("/")]
#[tracing::instrument(skip(db, views, session))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Option<Principal>,
    session: Session,
) -> Result<HttpResponse, Error> {
    let campaigns: Vec<_> = manager::get_campaigns(&***db)
        .await?
        .into_iter()
        .map(|(campaign, count)| CampaignBody::render(campaign, count))
        .collect();

    let mut context = views::context(principal.as_ref());
    context.insert("campaigns", &campaigns);
    context.insert("message", &take_flash(&session));

    views::page(&***views, "index.html", &context)
}

#[get("/campaign/new")]
#[tracing::instrument(skip(views))]
pub async fn new_campaign(
    views: Data<Box<dyn ViewRenderer>>,
    principal: Principal,
) -> Result<HttpResponse, Error> {
    let mut context = views::context(Some(&principal));
    context.insert("form", &CreateCampaignForm::default());
    context.insert("errors", &Violations::new());

    views::page(&***views, "campaign/new.html", &context)
}

#[get("/campaign/{campaign_id}")]
#[tracing::instrument(skip(db, views, session))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Option<Principal>,
    session: Session,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    render_campaign_page(
        &***db,
        &***views,
        principal.as_ref(),
        campaign_id,
        &SignatureForm::default(),
        &Violations::new(),
        take_flash(&session),
    )
    .await
}

#[post("/campaign/{campaign_id}/sign")]
#[tracing::instrument(skip(db, views, session))]
pub async fn sign_campaign(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Option<Principal>,
    session: Session,
    params: Path<CampaignId>,
    form: Form<SignatureForm>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();
    let form = form.into_inner();

    let new_signature = match form.validate(campaign_id) {
        Ok(new_signature) => new_signature,
        Err(errors) => {
            return render_campaign_page(
                &***db,
                &***views,
                principal.as_ref(),
                campaign_id,
                &form,
                &errors,
                None,
            )
            .await;
        }
    };

    manager::sign_campaign(&***db, new_signature).await?;

    put_flash(&session, SIGNED_MESSAGE)?;
    Ok(views::redirect(&format!("/campaign/{}", campaign_id)))
}

#[post("/campaign")]
#[tracing::instrument(skip(db, views, session))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Principal,
    session: Session,
    form: Form<CreateCampaignForm>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    let submitted = match form.validate() {
        Ok(submitted) => submitted,
        Err(errors) => {
            let mut context = views::context(Some(&principal));
            context.insert("form", &form);
            context.insert("errors", &errors);
            return views::page(&***views, "campaign/new.html", &context);
        }
    };

    let campaign = manager::create_campaign(&***db, &principal, submitted).await?;

    put_flash(&session, CREATED_MESSAGE)?;
    Ok(views::redirect(&format!("/campaign/{}", campaign.id)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db, views))]
pub async fn get_owned_campaigns(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Principal,
) -> Result<HttpResponse, Error> {
    let campaigns: Vec<_> = manager::get_owned_campaigns(&***db, &principal)
        .await?
        .into_iter()
        .map(|(campaign, count)| CampaignBody::render(campaign, count))
        .collect();

    let mut context = views::context(Some(&principal));
    context.insert("campaigns", &campaigns);

    views::page(&***views, "campaign/list.html", &context)
}
