use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_session::{SessionGetError, SessionInsertError};
use actix_web::error::{PathError, UrlencodedError};
use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use argon2::password_hash::Error as PasswordHashError;
use derivative::Derivative;
use mongodb::error::Error as DatabaseError;
use tera::Error as TemplateError;

use crate::campaign::CampaignId;
use crate::user::UserId;

#[derive(Debug, Derivative)]
#[derivative(PartialEq, Eq)]
pub enum Error {
    // 400
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),

    // 303
    NotAuthenticated,

    // 401
    InvalidCredentials,

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    UserNotFound {
        user_id: UserId,
    },

    // 409
    EmailAlreadyRegistered {
        email: String,
    },

    // 500
    MisconfiguredEnvironment {
        variable: &'static str,
    },
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    FailedToRenderTemplate(#[derivative(PartialEq = "ignore")] TemplateError),
    FailedToHashPassword(#[derivative(PartialEq = "ignore")] PasswordHashError),
    FailedSessionAccess(String),
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::NotAuthenticated => "E3031000",
            Error::InvalidCredentials => "E4011000",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::UserNotFound { .. } => "E4041002",
            Error::EmailAlreadyRegistered { .. } => "E4091000",
            Error::MisconfiguredEnvironment { .. } => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToRenderTemplate(_) => "E5001002",
            Error::FailedToHashPassword(_) => "E5001003",
            Error::FailedSessionAccess(_) => "E5001004",
            Error::IoError(_) => "E5001005",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::NotAuthenticated => "The requested page requires a logged in user",
            Error::InvalidCredentials => "The given email or password is incorrect",
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::UserNotFound { .. } => "The requested user was not found",
            Error::EmailAlreadyRegistered { .. } => "The given email is already registered",
            Error::MisconfiguredEnvironment { .. } => "The server environment is misconfigured",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToRenderTemplate(_) => "An error occurred when rendering the page",
            Error::FailedToHashPassword(_) => "An error occurred when hashing a password",
            Error::FailedSessionAccess(_) => "An error occurred when accessing the session",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::NotAuthenticated => StatusCode::SEE_OTHER,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Error::EmailAlreadyRegistered { .. } => StatusCode::CONFLICT,
            Error::MisconfiguredEnvironment { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToRenderTemplate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToHashPassword(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedSessionAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::NotAuthenticated = self {
            return HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login"))
                .finish();
        }

        // code and message are static, so nothing here needs escaping
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(format!(
                "<!DOCTYPE html>\n<html><head><title>{code}</title></head>\
                 <body><h1>{message}</h1><p>{code}</p><p><a href=\"/\">Back to top</a></p>\
                 </body></html>\n",
                code = self.error_code(),
                message = self.error_message(),
            ))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<TemplateError> for Error {
    fn from(error: TemplateError) -> Error {
        Error::FailedToRenderTemplate(error)
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Error {
        Error::FailedToHashPassword(error)
    }
}

impl From<SessionGetError> for Error {
    fn from(error: SessionGetError) -> Error {
        Error::FailedSessionAccess(error.to_string())
    }
}

impl From<SessionInsertError> for Error {
    fn from(error: SessionInsertError) -> Error {
        Error::FailedSessionAccess(error.to_string())
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToRenderTemplate(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_requests_are_sent_to_login() {
        let response = Error::NotAuthenticated.error_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }

    #[test]
    fn missing_campaign_is_a_not_found_page() {
        let error = Error::CampaignNotFound {
            campaign_id: CampaignId::new(),
        };

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.error_response().status(), StatusCode::NOT_FOUND);
    }
}
