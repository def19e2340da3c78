// src/core/users.rs
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum UserType {
    JobSeeker,
    Employer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::JobSeeker => "job_seeker",
            UserType::Employer => "employer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserType::JobSeeker => "Job Seeker",
            UserType::Employer => "Employer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "job_seeker" => Ok(UserType::JobSeeker),
            "employer" => Ok(UserType::Employer),
            other => Err(format!("Unknown account type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub full_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_employer(&self) -> bool {
        self.user_type == UserType::Employer
    }

    pub fn is_job_seeker(&self) -> bool {
        self.user_type == UserType::JobSeeker
    }
}

/// A validated registration, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub full_name: String,
    pub phone: String,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_user: &NewUser) -> sqlx::Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, user_type, full_name, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.user_type)
        .bind(&new_user.full_name)
        .bind(&new_user.phone)
        .bind(now)
        .execute(self.pool)
        .await?;

        let user = User {
            id: result.last_insert_rowid(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            user_type: new_user.user_type,
            full_name: new_user.full_name.clone(),
            phone: new_user.phone.clone(),
            created_at: now,
        };

        info!(
            "Created {} account {} ({})",
            user.user_type, user.username, user.id
        );
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, user_type, full_name, phone, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, user_type, full_name, phone, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn username_taken(&self, username: &str) -> sqlx::Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn email_taken(&self, email: &str) -> sqlx::Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn count(&self) -> sqlx::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    fn sample(username: &str, email: &str, user_type: UserType) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            user_type,
            full_name: "Sample Person".to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_user_type_parsing() {
        assert_eq!("employer".parse::<UserType>(), Ok(UserType::Employer));
        assert_eq!("job_seeker".parse::<UserType>(), Ok(UserType::JobSeeker));
        assert!("admin".parse::<UserType>().is_err());
        assert!("Employer".parse::<UserType>().is_err());
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(db.pool());

        let created = repo
            .create(&sample("boss", "boss@example.com", UserType::Employer))
            .await
            .unwrap();

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "boss");
        assert_eq!(by_id.user_type, UserType::Employer);

        let by_email = repo.find_by_email("boss@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.username_taken("boss").await.unwrap());
        assert!(repo.email_taken("boss@example.com").await.unwrap());
        assert!(!repo.email_taken("other@example.com").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(db.pool());

        repo.create(&sample("alice", "alice@example.com", UserType::JobSeeker))
            .await
            .unwrap();

        let err = repo
            .create(&sample("alice", "alice2@example.com", UserType::JobSeeker))
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::Database(ref e) if e.is_unique_violation()));
    }
}
