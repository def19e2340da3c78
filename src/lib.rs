pub mod auth;
pub mod cli;
pub mod core;
pub mod error;
pub mod uploads;
pub mod utils;
pub mod web;

pub use error::PortalError;
pub use web::{build_rocket, start_web_server};
