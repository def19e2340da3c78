// src/core/applications.rs
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub cover_letter: String,
    pub resume_path: Option<String>,
    pub date_applied: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub user_id: i64,
    pub cover_letter: String,
    pub resume_path: Option<String>,
}

/// An application joined with the applicant, as reviewed by the employer
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicantEntry {
    pub id: i64,
    pub cover_letter: String,
    pub resume_path: Option<String>,
    pub date_applied: DateTime<Utc>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
}

/// An application joined with its job, as listed for the applicant
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmittedApplication {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub company: String,
    pub resume_path: Option<String>,
    pub date_applied: DateTime<Utc>,
}

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_application: &NewApplication) -> sqlx::Result<Application> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO applications (job_id, user_id, cover_letter, resume_path, date_applied)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_application.job_id)
        .bind(new_application.user_id)
        .bind(&new_application.cover_letter)
        .bind(&new_application.resume_path)
        .bind(now)
        .execute(self.pool)
        .await?;

        let application = Application {
            id: result.last_insert_rowid(),
            job_id: new_application.job_id,
            user_id: new_application.user_id,
            cover_letter: new_application.cover_letter.clone(),
            resume_path: new_application.resume_path.clone(),
            date_applied: now,
        };

        info!(
            "User {} applied to job {} (application {})",
            application.user_id, application.job_id, application.id
        );
        Ok(application)
    }

    pub async fn exists_for(&self, job_id: i64, user_id: i64) -> sqlx::Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE job_id = ? AND user_id = ?")
                .bind(job_id)
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn list_for_job(&self, job_id: i64) -> sqlx::Result<Vec<ApplicantEntry>> {
        sqlx::query_as::<_, ApplicantEntry>(
            r#"
            SELECT a.id, a.cover_letter, a.resume_path, a.date_applied,
                   u.full_name AS applicant_name,
                   u.email AS applicant_email,
                   u.phone AS applicant_phone
            FROM applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.job_id = ?
            ORDER BY a.date_applied DESC, a.id DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> sqlx::Result<Vec<SubmittedApplication>> {
        sqlx::query_as::<_, SubmittedApplication>(
            r#"
            SELECT a.id, a.job_id, j.title AS job_title, j.company, a.resume_path, a.date_applied
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.user_id = ?
            ORDER BY a.date_applied DESC, a.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::jobs::{JobDraft, JobRepository};
    use crate::core::users::{NewUser, UserRepository, UserType};
    use crate::core::Database;

    async fn user(db: &Database, username: &str, user_type: UserType) -> i64 {
        UserRepository::new(db.pool())
            .create(&NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hash".to_string(),
                user_type,
                full_name: format!("{} Person", username),
                phone: "+1234567890".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let employer = user(&db, "employer", UserType::Employer).await;
        let seeker = user(&db, "seeker", UserType::JobSeeker).await;

        let jobs = JobRepository::new(db.pool());
        let job = jobs
            .create(
                employer,
                &JobDraft {
                    title: "Test Job".to_string(),
                    description: "Description".to_string(),
                    location: "Remote".to_string(),
                    company: "Test Company".to_string(),
                    ..JobDraft::default()
                },
            )
            .await
            .unwrap();

        let repo = ApplicationRepository::new(db.pool());
        repo.create(&NewApplication {
            job_id: job.id,
            user_id: seeker,
            cover_letter: "Test cover letter".to_string(),
            resume_path: Some("abc_resume.pdf".to_string()),
        })
        .await
        .unwrap();

        assert!(repo.exists_for(job.id, seeker).await.unwrap());

        let entries = repo.list_for_job(job.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].applicant_email, "seeker@example.com");
        assert_eq!(entries[0].cover_letter, "Test cover letter");

        let mine = repo.list_for_user(seeker).await.unwrap();
        assert_eq!(mine[0].job_title, "Test Job");

        let summaries = jobs.list_for_employer(employer).await.unwrap();
        assert_eq!(summaries[0].application_count, 1);

        let resumes = jobs.delete(job.id).await.unwrap();
        assert_eq!(resumes, vec!["abc_resume.pdf".to_string()]);
        assert!(repo.list_for_user(seeker).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_references_are_enforced() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let seeker = user(&db, "seeker", UserType::JobSeeker).await;

        let err = ApplicationRepository::new(db.pool())
            .create(&NewApplication {
                job_id: 999,
                user_id: seeker,
                cover_letter: "Hello".to_string(),
                resume_path: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::Database(ref e) if e.is_foreign_key_violation()));
    }
}
