use actix_web::http::header::{self, ContentType};
use actix_web::HttpResponse;
use tera::{Context, Tera};

use crate::error::Error;
use crate::user::Principal;

pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, context: &Context) -> Result<String, Error>;
}

/// Server-side templates compiled into the binary.
pub struct TeraViews {
    tera: Tera,
}

impl TeraViews {
    pub fn new() -> Result<TeraViews, Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            (
                "campaign/index.html",
                include_str!("../templates/campaign/index.html"),
            ),
            (
                "campaign/new.html",
                include_str!("../templates/campaign/new.html"),
            ),
            (
                "campaign/list.html",
                include_str!("../templates/campaign/list.html"),
            ),
            (
                "user/profile_fields.html",
                include_str!("../templates/user/profile_fields.html"),
            ),
            ("user/edit.html", include_str!("../templates/user/edit.html")),
            ("user/login.html", include_str!("../templates/user/login.html")),
            (
                "user/register.html",
                include_str!("../templates/user/register.html"),
            ),
        ])?;

        Ok(TeraViews { tera })
    }
}

impl ViewRenderer for TeraViews {
    #[tracing::instrument(skip(self, context))]
    fn render(&self, template: &str, context: &Context) -> Result<String, Error> {
        let body = self.tera.render(template, context)?;

        Ok(body)
    }
}

/// Starts a template context with the values every page's layout needs.
pub fn context(principal: Option<&Principal>) -> Context {
    let mut context = Context::new();
    context.insert("principal", &principal);
    context
}

pub fn page(views: &dyn ViewRenderer, template: &str, context: &Context) -> Result<HttpResponse, Error> {
    let body = views.render(template, context)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
