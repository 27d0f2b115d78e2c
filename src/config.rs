use std::convert::TryFrom;
use std::env;
use std::str::FromStr;

use actix_web::cookie::Key;
use tracing::{info, warn, Level};

use crate::error::Error;

pub struct Config {
    pub bind_address: String,
    pub database_uri: String,
    pub database_name: String,
    pub session_key: Key,
    pub seed: bool,
    pub log_level: Level,
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        Ok(Config {
            bind_address: try_load("SIGCOLLE_BIND_ADDRESS", "127.0.0.1:8080")?,
            database_uri: try_load("SIGCOLLE_DATABASE_URI", "mongodb://localhost:27017")?,
            database_name: try_load("SIGCOLLE_DATABASE_NAME", "sigcolle")?,
            session_key: load_session_key("SIGCOLLE_SESSION_KEY")?,
            seed: try_load("SIGCOLLE_SEED", "false")?,
            log_level: try_load(LOG_LEVEL, DEFAULT_LOG_LEVEL)?,
        })
    }

    /// Read ahead of [`Config::load`] to install the subscriber, so this does
    /// not log; `load` reports the level again once logging is up.
    pub fn log_level() -> Result<Level, Error> {
        let value = env::var(LOG_LEVEL).ok();

        parse_or_default(LOG_LEVEL, value.as_deref(), DEFAULT_LOG_LEVEL)
    }
}

const LOG_LEVEL: &str = "SIGCOLLE_LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "info";

fn try_load<T: FromStr>(variable: &'static str, default: &str) -> Result<T, Error> {
    let value = env::var(variable).ok();
    if value.is_none() {
        info!("{} not set, using default: {}", variable, default);
    }

    parse_or_default(variable, value.as_deref(), default)
}

fn parse_or_default<T: FromStr>(
    variable: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<T, Error> {
    value
        .unwrap_or(default)
        .parse()
        .map_err(|_| Error::MisconfiguredEnvironment { variable })
}

// the cookie signing key needs at least 64 bytes of secret
fn load_session_key(variable: &'static str) -> Result<Key, Error> {
    match env::var(variable) {
        Ok(secret) => {
            Key::try_from(secret.as_bytes()).map_err(|_| Error::MisconfiguredEnvironment { variable })
        }
        Err(_) => {
            warn!(
                "{} not set, sessions will not survive a restart",
                variable
            );
            Ok(Key::generate())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_takes_default() {
        let level: Level = parse_or_default(LOG_LEVEL, None, DEFAULT_LOG_LEVEL).unwrap();

        assert_eq!(level, Level::INFO);
    }

    #[test]
    fn present_value_overrides_default() {
        let level: Level = parse_or_default(LOG_LEVEL, Some("debug"), DEFAULT_LOG_LEVEL).unwrap();

        assert_eq!(level, Level::DEBUG);
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let result: Result<bool, Error> = parse_or_default("SIGCOLLE_SEED", Some("yes please"), "false");

        assert_eq!(
            result.unwrap_err(),
            Error::MisconfiguredEnvironment {
                variable: "SIGCOLLE_SEED"
            }
        );
    }
}
