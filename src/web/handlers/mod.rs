// src/web/handlers/mod.rs
pub mod application_handlers;
pub mod auth_handlers;
pub mod job_handlers;
pub mod system_handlers;

pub use application_handlers::*;
pub use auth_handlers::*;
pub use job_handlers::*;
pub use system_handlers::*;

use askama::Template;
use rocket::http::Status;

use crate::error::PortalError;
use crate::web::types::Reply;
use crate::web::views::render;

pub(crate) fn page<T: Template>(page: &T) -> Result<Reply, PortalError> {
    Ok(Reply::Page(render(page)?))
}

/// Re-render a form with the status of the failure that sent it back
pub(crate) fn rejected<T: Template>(status: Status, page: &T) -> Result<Reply, PortalError> {
    Ok(Reply::Rejected((status, render(page)?)))
}
