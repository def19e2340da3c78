// src/core/mod.rs
//! Configuration, persistence and file storage shared by the web layer and the CLI

pub mod applications;
pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod jobs;
pub mod pagination;
pub mod seed;
pub mod users;

pub use config_manager::{ConfigManager, PortalConfig, Profile};
pub use database::Database;
pub use fs_ops::FsOps;
