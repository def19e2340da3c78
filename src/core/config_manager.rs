// src/core/config_manager.rs
//! Environment-driven configuration with development/production/testing profiles

use anyhow::{bail, Context, Result};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::core::FsOps;

pub const JOBS_PER_PAGE: i64 = 10;
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];
pub const SESSION_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Only used outside production. Rocket derives the cookie keys from it.
const DEV_SECRET_KEY: &str = "f0c23d880346d1ef4f61655511699260-job-portal-development-key";
const DEFAULT_DATABASE_URL: &str = "sqlite://instance/site.db";
const TESTING_DATABASE_URL: &str = "sqlite::memory:";
const MIN_SECRET_KEY_BYTES: usize = 32;
const TESTING_BCRYPT_COST: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
    Testing,
}

impl Profile {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "default" | "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "testing" | "test" => Ok(Self::Testing),
            other => bail!(
                "Unknown configuration profile '{}'. Use development, production or testing",
                other
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

/// Bind address and cookie key material for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub secret_key: String,
}

/// Settings handed to request handlers as managed state
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub upload_dir: PathBuf,
    pub jobs_per_page: i64,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub session_lifetime: Duration,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub profile: Profile,
    pub server: ServerConfig,
    pub database_url: String,
    pub portal: PortalConfig,
}

impl ConfigManager {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile_name = lookup("PORTAL_CONFIG")
            .or_else(|| lookup("FLASK_CONFIG"))
            .unwrap_or_else(|| "development".to_string());
        let profile = Profile::parse(&profile_name)?;
        info!("Loading configuration for profile: {}", profile.as_str());

        let secret_key = match (lookup("SECRET_KEY"), profile) {
            (Some(key), _) => key,
            (None, Profile::Production) => {
                bail!("SECRET_KEY must be set in the production profile")
            }
            (None, _) => DEV_SECRET_KEY.to_string(),
        };
        if secret_key.len() < MIN_SECRET_KEY_BYTES {
            bail!(
                "SECRET_KEY must be at least {} bytes long",
                MIN_SECRET_KEY_BYTES
            );
        }

        let database_url = match (lookup("DATABASE_URL"), profile) {
            (_, Profile::Testing) => TESTING_DATABASE_URL.to_string(),
            (Some(url), _) => url,
            (None, Profile::Production) => {
                bail!("DATABASE_URL must be set in the production profile")
            }
            (None, _) => DEFAULT_DATABASE_URL.to_string(),
        };

        let host = lookup("FLASK_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .context("FLASK_HOST must be a valid IP address")?;

        let port = lookup("FLASK_PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .context("FLASK_PORT must be a valid port number")?;

        let upload_dir = lookup("UPLOAD_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static").join("uploads"));

        let bcrypt_cost = if profile == Profile::Testing {
            TESTING_BCRYPT_COST
        } else {
            bcrypt::DEFAULT_COST
        };

        Ok(Self {
            profile,
            server: ServerConfig {
                host,
                port,
                secret_key,
            },
            database_url,
            portal: PortalConfig {
                upload_dir,
                jobs_per_page: JOBS_PER_PAGE,
                max_upload_bytes: MAX_UPLOAD_BYTES,
                allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
                session_lifetime: SESSION_LIFETIME,
                bcrypt_cost,
            },
        })
    }

    /// Testing profile rooted at the given upload directory
    pub fn for_testing(upload_dir: PathBuf) -> Result<Self> {
        let mut config = Self::from_lookup(|key| match key {
            "FLASK_CONFIG" => Some("testing".to_string()),
            _ => None,
        })?;
        config.portal.upload_dir = upload_dir;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.profile == Profile::Production
    }

    /// Ensure the upload folder exists
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.portal.upload_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ConfigManager> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigManager::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.portal.jobs_per_page, 10);
        assert_eq!(config.portal.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.portal.session_lifetime.as_secs(), 604_800);
    }

    #[test]
    fn test_production_requires_secrets() {
        assert!(load(&[("FLASK_CONFIG", "production")]).is_err());
        assert!(load(&[
            ("FLASK_CONFIG", "production"),
            ("SECRET_KEY", "0123456789abcdef0123456789abcdef"),
        ])
        .is_err());

        let config = load(&[
            ("FLASK_CONFIG", "production"),
            ("SECRET_KEY", "0123456789abcdef0123456789abcdef"),
            ("DATABASE_URL", "sqlite:///var/lib/portal/site.db"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.portal.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_short_secret_key_rejected() {
        assert!(load(&[("SECRET_KEY", "too-short")]).is_err());
    }

    #[test]
    fn test_testing_profile_uses_memory_database() {
        let config = load(&[
            ("FLASK_CONFIG", "testing"),
            ("DATABASE_URL", "sqlite://ignored.db"),
        ])
        .unwrap();
        assert_eq!(config.database_url, TESTING_DATABASE_URL);
        assert_eq!(config.portal.bcrypt_cost, TESTING_BCRYPT_COST);
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("FLASK_CONFIG", "staging")]).is_err());
        assert!(load(&[("FLASK_PORT", "http")]).is_err());
        assert!(load(&[("FLASK_HOST", "localhost:80")]).is_err());
    }

    #[test]
    fn test_portal_config_alias_wins() {
        let config = load(&[("PORTAL_CONFIG", "testing"), ("FLASK_CONFIG", "production")]).unwrap();
        assert_eq!(config.profile, Profile::Testing);
    }
}
