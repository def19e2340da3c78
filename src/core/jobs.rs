// src/core/jobs.rs
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::core::pagination::Paginated;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: String,
    pub company: String,
    pub employer_id: i64,
    pub date_posted: DateTime<Utc>,
}

impl Job {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.employer_id == user_id
    }
}

/// Editable fields of a posting, already validated
#[derive(Debug, Clone, Default)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: String,
    pub company: String,
}

/// A posting as listed on its employer's dashboard
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployerJobSummary {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: DateTime<Utc>,
    pub application_count: i64,
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, employer_id: i64, draft: &JobDraft) -> sqlx::Result<Job> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, description, requirements, location, salary, company, employer_id, date_posted)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.requirements)
        .bind(&draft.location)
        .bind(&draft.salary)
        .bind(&draft.company)
        .bind(employer_id)
        .bind(now)
        .execute(self.pool)
        .await?;

        let job = Job {
            id: result.last_insert_rowid(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            requirements: draft.requirements.clone(),
            location: draft.location.clone(),
            salary: draft.salary.clone(),
            company: draft.company.clone(),
            employer_id,
            date_posted: now,
        };

        info!("Created job {} '{}' for employer {}", job.id, job.title, employer_id);
        Ok(job)
    }

    pub async fn find_by_id(&self, id: i64) -> sqlx::Result<Option<Job>> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, description, requirements, location, salary, company, employer_id, date_posted
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn update(&self, id: i64, draft: &JobDraft) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = ?, description = ?, requirements = ?, location = ?, salary = ?, company = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.requirements)
        .bind(&draft.location)
        .bind(&draft.salary)
        .bind(&draft.company)
        .bind(id)
        .execute(self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!("Updated job {}", id);
        }
        Ok(updated)
    }

    /// Delete a job together with its applications in one transaction.
    /// Returns the resume paths those applications referenced.
    pub async fn delete(&self, id: i64) -> sqlx::Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        let resumes: Vec<(String,)> = sqlx::query_as(
            "SELECT resume_path FROM applications WHERE job_id = ? AND resume_path IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let removed_applications = sqlx::query("DELETE FROM applications WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Deleted job {} and {} application(s)",
            id, removed_applications
        );
        Ok(resumes.into_iter().map(|(path,)| path).collect())
    }

    /// Jobs whose title contains `term` (case-insensitive), newest first
    pub async fn search(
        &self,
        term: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> sqlx::Result<Paginated<Job>> {
        let pattern = like_pattern(term.unwrap_or(""));

        let (total,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM jobs WHERE title LIKE ? ESCAPE '\'"#)
                .bind(&pattern)
                .fetch_one(self.pool)
                .await?;

        let offset = match Paginated::<Job>::offset(page, per_page) {
            Some(offset) if page >= 1 => Some(offset),
            _ => None,
        };

        let items = if let Some(offset) = offset {
            sqlx::query_as::<_, Job>(
                r#"
                SELECT id, title, description, requirements, location, salary, company, employer_id, date_posted
                FROM jobs
                WHERE title LIKE ? ESCAPE '\'
                ORDER BY date_posted DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(self.pool)
            .await?
        } else {
            Vec::new()
        };

        Ok(Paginated {
            items,
            page,
            per_page,
            total,
        })
    }

    pub async fn recent(&self, limit: i64) -> sqlx::Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, description, requirements, location, salary, company, employer_id, date_posted
            FROM jobs
            ORDER BY date_posted DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    pub async fn list_for_employer(&self, employer_id: i64) -> sqlx::Result<Vec<EmployerJobSummary>> {
        sqlx::query_as::<_, EmployerJobSummary>(
            r#"
            SELECT j.id, j.title, j.company, j.location, j.date_posted,
                   COUNT(a.id) AS application_count
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.id
            WHERE j.employer_id = ?
            GROUP BY j.id
            ORDER BY j.date_posted DESC, j.id DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(self.pool)
        .await
    }
}

/// Substring pattern for `LIKE ... ESCAPE '\'` with wildcards in `term` taken literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users::{NewUser, UserRepository, UserType};
    use crate::core::Database;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern(" Test "), "%Test%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    async fn setup() -> (Database, i64) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let employer = UserRepository::new(db.pool())
            .create(&NewUser {
                username: "employer".to_string(),
                email: "employer@example.com".to_string(),
                password_hash: "hash".to_string(),
                user_type: UserType::Employer,
                full_name: "Jane Smith".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        (db, employer.id)
    }

    fn draft(title: &str) -> JobDraft {
        JobDraft {
            title: title.to_string(),
            description: "Description".to_string(),
            location: "Remote".to_string(),
            company: "Tech Corp".to_string(),
            ..JobDraft::default()
        }
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let (db, employer_id) = setup().await;
        let repo = JobRepository::new(db.pool());

        for title in ["Test Job", "Senior tester", "Data Scientist", "100% Remote"] {
            repo.create(employer_id, &draft(title)).await.unwrap();
        }

        let page = repo.search(Some("test"), 1, 10).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Senior tester", "Test Job"]);
        assert_eq!(page.total, 2);

        let literal = repo.search(Some("%"), 1, 10).await.unwrap();
        assert_eq!(literal.total, 1);
        assert_eq!(literal.items[0].title, "100% Remote");

        let all = repo.search(None, 1, 10).await.unwrap();
        assert_eq!(all.total, 4);
    }

    #[tokio::test]
    async fn test_pagination_is_stable() {
        let (db, employer_id) = setup().await;
        let repo = JobRepository::new(db.pool());

        for n in 0..23 {
            repo.create(employer_id, &draft(&format!("Job {}", n)))
                .await
                .unwrap();
        }

        let first = repo.search(None, 1, 10).await.unwrap();
        let again = repo.search(None, 1, 10).await.unwrap();
        let ids: Vec<i64> = first.items.iter().map(|j| j.id).collect();
        let ids_again: Vec<i64> = again.items.iter().map(|j| j.id).collect();
        assert_eq!(ids, ids_again);
        assert_eq!(first.items[0].title, "Job 22");

        let third = repo.search(None, 3, 10).await.unwrap();
        assert_eq!(third.items.len(), 3);
        assert_eq!(third.pages(), 3);
        assert!(!third.has_next());

        let beyond = repo.search(None, 4, 10).await.unwrap();
        assert!(beyond.is_out_of_range());
    }

    #[tokio::test]
    async fn test_huge_page_numbers_are_out_of_range() {
        let (db, employer_id) = setup().await;
        let repo = JobRepository::new(db.pool());
        repo.create(employer_id, &draft("Only job")).await.unwrap();

        let huge = repo.search(None, i64::MAX, 10).await.unwrap();
        assert!(huge.items.is_empty());
        assert_eq!(huge.total, 1);
        assert!(huge.is_out_of_range());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, employer_id) = setup().await;
        let repo = JobRepository::new(db.pool());

        let job = repo.create(employer_id, &draft("Old title")).await.unwrap();
        assert!(repo.update(job.id, &draft("New title")).await.unwrap());
        assert_eq!(
            repo.find_by_id(job.id).await.unwrap().unwrap().title,
            "New title"
        );

        let summaries = repo.list_for_employer(employer_id).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].application_count, 0);

        assert!(repo.delete(job.id).await.unwrap().is_empty());
        assert!(repo.find_by_id(job.id).await.unwrap().is_none());
        assert!(!repo.update(job.id, &draft("Gone")).await.unwrap());
    }
}
