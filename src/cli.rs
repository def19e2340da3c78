// src/cli.rs
use crate::core::seed::{seed_sample_data, SeedOutcome, SAMPLE_PASSWORD};
use crate::core::{ConfigManager, Database};
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "job-portal")]
#[command(about = "Job portal web application")]
pub struct PortalCli {
    #[command(subcommand)]
    pub command: Option<PortalCommand>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PortalCommand {
    /// Run the web server (default)
    Serve,
    /// Create the database tables and load sample data
    InitDb {
        /// Only create the tables
        #[arg(long)]
        no_sample_data: bool,
    },
}

pub async fn handle_command(cli: PortalCli, config: ConfigManager) -> Result<()> {
    match cli.command.unwrap_or(PortalCommand::Serve) {
        PortalCommand::Serve => start_web_server(config).await,
        PortalCommand::InitDb { no_sample_data } => init_db(&config, no_sample_data).await,
    }
}

async fn init_db(config: &ConfigManager, no_sample_data: bool) -> Result<()> {
    let db = Database::connect(&config.database_url)
        .await
        .context("Database initialization failed")?;
    info!("Database tables created successfully");

    if no_sample_data {
        return Ok(());
    }

    match seed_sample_data(&db, config.portal.bcrypt_cost).await? {
        SeedOutcome::Seeded { users, jobs } => {
            info!("Sample data created: {} users, {} jobs", users, jobs);
            info!("Job seeker login: jobseeker@example.com / {}", SAMPLE_PASSWORD);
            info!("Employer login: employer@example.com / {}", SAMPLE_PASSWORD);
        }
        SeedOutcome::AlreadyPopulated => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = PortalCli::try_parse_from(["job-portal"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = PortalCli::try_parse_from(["job-portal", "serve"]).unwrap();
        assert_eq!(cli.command, Some(PortalCommand::Serve));

        let cli = PortalCli::try_parse_from(["job-portal", "init-db", "--no-sample-data"]).unwrap();
        assert_eq!(
            cli.command,
            Some(PortalCommand::InitDb {
                no_sample_data: true
            })
        );

        assert!(PortalCli::try_parse_from(["job-portal", "drop-db"]).is_err());
    }

    #[tokio::test]
    async fn test_init_db_seeds_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("instance").join("site.db");

        let mut config = ConfigManager::for_testing(dir.path().join("uploads")).unwrap();
        config.database_url = format!("sqlite://{}", db_path.display());

        init_db(&config, false).await.unwrap();
        init_db(&config, false).await.unwrap();
        assert!(db_path.exists());

        let db = Database::connect(&config.database_url).await.unwrap();
        let users = crate::core::users::UserRepository::new(db.pool())
            .count()
            .await
            .unwrap();
        assert_eq!(users, 2);
    }
}
