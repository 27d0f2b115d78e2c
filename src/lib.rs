use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::web::{self, Data, FormConfig, PathConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod flash;
pub mod markdown;
pub mod seed;
pub mod signature;
pub mod typedid;
pub mod user;
pub mod views;
pub mod violations;

use crate::config::Config;
use crate::database::{Database, MongoDatabase};
use crate::error::Error;
use crate::views::{TeraViews, ViewRenderer};

const FORM_MAX_BYTES: usize = 256 * 1024;

/// Registers every route along with the extractor error handlers.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(FormConfig::default().limit(FORM_MAX_BYTES).error_handler(|err, _req| {
        // format form errors with custom format
        Error::InvalidForm(err).into()
    }))
    .service(campaign::endpoints::get_campaigns)
    // must precede get_campaign_by_id, which would reject "new" as an id
    .service(campaign::endpoints::new_campaign)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::sign_campaign)
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_owned_campaigns)
    .service(user::endpoints::edit_profile)
    .service(user::endpoints::update_profile)
    .service(user::endpoints::register_form)
    .service(user::endpoints::register)
    .service(user::endpoints::login_form)
    .service(user::endpoints::login)
    .service(user::endpoints::logout);
}

pub async fn run(config: Config) -> Result<(), Error> {
    info!("connecting to db: {}", config.database_uri);
    let db = Client::with_uri_str(&config.database_uri)
        .await?
        .database(&config.database_name);
    let db = MongoDatabase::initialize(db).await?;

    if config.seed {
        seed::seed(&db).await?;
    }

    let db = Data::new(Box::new(db) as Box<dyn Database>);
    let views = Data::new(Box::new(TeraViews::new()?) as Box<dyn ViewRenderer>);
    let session_key = config.session_key;

    info!("listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(views.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .wrap(TracingLogger::default())
            .configure(configure)
            .default_service(web::to(|| async { Error::PathNotFound.error_response() }))
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_app(
    db: database::test::MockDatabase,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let views = TeraViews::new().unwrap();

    App::new()
        .app_data(Data::new(Box::new(db) as Box<dyn Database>))
        .app_data(Data::new(Box::new(views) as Box<dyn ViewRenderer>))
        .wrap(SessionMiddleware::new(
            CookieSessionStore::default(),
            actix_web::cookie::Key::generate(),
        ))
        .configure(configure)
        .default_service(web::to(|| async { Error::PathNotFound.error_response() }))
}
