// src/core/database.rs
//! Connection pool and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::core::FsOps;

const MIGRATIONS: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        user_type TEXT NOT NULL CHECK (user_type IN ('job_seeker', 'employer')),
        full_name TEXT NOT NULL,
        phone TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        requirements TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL,
        salary TEXT NOT NULL DEFAULT '',
        company TEXT NOT NULL,
        employer_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
        date_posted TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_date_posted ON jobs(date_posted DESC, id DESC);",
    "CREATE INDEX IF NOT EXISTS idx_jobs_employer_id ON jobs(employer_id);",
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
        cover_letter TEXT NOT NULL,
        resume_path TEXT,
        date_applied TEXT NOT NULL,
        UNIQUE (job_id, user_id)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_applications_job_id ON applications(job_id);",
    "CREATE INDEX IF NOT EXISTS idx_applications_user_id ON applications(user_id);",
];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = is_in_memory(database_url);

        let pool_options = if in_memory {
            // The schema lives only as long as its connection does.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    FsOps::ensure_dir_exists(parent).await?;
                }
            }
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;

        info!("Database connection established: {}", database_url);

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get pool reference for repositories
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run database migration")?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:portal?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://instance/site.db"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, vec!["applications", "jobs", "users"]);
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instance").join("site.db");
        let url = format!("sqlite://{}", path.display());

        Database::connect(&url).await.unwrap();
        assert!(path.exists());
    }
}
