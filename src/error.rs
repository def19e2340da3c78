// src/error.rs
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rocket::http::Status;
use rocket::response::{self, Flash, Redirect, Responder};
use rocket::Request;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::{AuthError, SessionState};
use crate::web::views::{render, ErrorPage, Layout};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";
const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{}", LOGIN_REQUIRED_MESSAGE)]
    LoginRequired,

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn status(&self) -> Status {
        match self {
            PortalError::Validation(_) => Status::BadRequest,
            PortalError::Auth(_) => Status::Unauthorized,
            PortalError::LoginRequired => Status::SeeOther,
            PortalError::Authorization(_) => Status::Forbidden,
            PortalError::NotFound(_) => Status::NotFound,
            PortalError::Storage(_) | PortalError::Template(_) | PortalError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    /// Message safe to show the visitor. Server-side failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            PortalError::Storage(_) | PortalError::Template(_) | PortalError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn job_not_found() -> Self {
        PortalError::NotFound("The requested job posting does not exist.".to_string())
    }
}

/// `/login?next=<current path>` so a successful login returns the visitor here
pub fn login_redirect_target(req: &Request<'_>) -> String {
    let current = req.uri().to_string();
    format!(
        "/login?next={}",
        utf8_percent_encode(&current, NON_ALPHANUMERIC)
    )
}

/// The shared error page, used by `PortalError` and by the catchers
pub struct ErrorReply {
    pub status: Status,
    pub message: String,
}

impl ErrorReply {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorReply {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        // Whoever got here first resolved the session; never hit the database from a responder.
        let session = req.local_cache(|| SessionState::Anonymous);
        let page = ErrorPage::new(
            Layout::new(session.user(), None),
            self.status,
            self.message.clone(),
        );

        match render(&page) {
            Ok(html) => (self.status, html).respond_to(req),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (self.status, self.message).respond_to(req)
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for PortalError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if let PortalError::LoginRequired = self {
            return Flash::new(
                Redirect::to(login_redirect_target(req)),
                "info",
                LOGIN_REQUIRED_MESSAGE,
            )
            .respond_to(req);
        }

        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} {} failed: {}", req.method(), req.uri(), self);
        } else {
            warn!("{} {} rejected ({}): {}", req.method(), req.uri(), status.code, self);
        }

        ErrorReply::new(status, self.public_message()).respond_to(req)
    }
}

impl From<AuthError> for PortalError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotLoggedIn => PortalError::LoginRequired,
            AuthError::WrongRole(role) => PortalError::Authorization(format!(
                "This page is only available to {} accounts.",
                role.label().to_lowercase()
            )),
            AuthError::SessionUnavailable => {
                PortalError::Internal(anyhow::anyhow!("Session lookup failed"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users::UserType;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PortalError::Validation("x".into()).status(),
            Status::BadRequest
        );
        assert_eq!(PortalError::Auth("x".into()).status(), Status::Unauthorized);
        assert_eq!(PortalError::LoginRequired.status(), Status::SeeOther);
        assert_eq!(
            PortalError::Authorization("x".into()).status(),
            Status::Forbidden
        );
        assert_eq!(PortalError::job_not_found().status(), Status::NotFound);
        assert_eq!(
            PortalError::Storage(sqlx::Error::RowNotFound).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = PortalError::Internal(anyhow::anyhow!("disk on fire at /srv/uploads"));
        assert!(!err.public_message().contains("/srv/uploads"));

        let err = PortalError::Validation("Cover letter is required.".into());
        assert_eq!(err.public_message(), "Cover letter is required.");
    }

    #[test]
    fn test_auth_errors_map_to_portal_errors() {
        assert!(matches!(
            PortalError::from(AuthError::NotLoggedIn),
            PortalError::LoginRequired
        ));
        match PortalError::from(AuthError::WrongRole(UserType::Employer)) {
            PortalError::Authorization(msg) => assert!(msg.contains("employer")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
