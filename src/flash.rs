use actix_session::Session;

use crate::error::Error;

const FLASH_KEY: &str = "flash";

/// Stores a message for the next page rendered for this session.
pub fn put_flash(session: &Session, message: &str) -> Result<(), Error> {
    session.insert(FLASH_KEY, message)?;

    Ok(())
}

/// Removes and returns the pending message, if any. A message is only ever
/// shown once.
pub fn take_flash(session: &Session) -> Option<String> {
    session
        .remove_as::<String>(FLASH_KEY)
        .and_then(|message| message.ok())
}
