use sigcolle::config::Config;
use sigcolle::error::Error;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Config::log_level()?)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = Config::load()?;
    info!("logging at level {}", config.log_level);

    sigcolle::run(config).await
}
