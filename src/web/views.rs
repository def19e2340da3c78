// src/web/views.rs
//! Page models rendered through the askama templates in `templates/`

use askama::Template;
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;

use crate::core::applications::{ApplicantEntry, SubmittedApplication};
use crate::core::jobs::{EmployerJobSummary, Job};
use crate::core::pagination::Paginated;
use crate::core::users::User;
use crate::error::PortalError;
use crate::utils::truncate_chars;
use crate::web::types::{JobForm, RegisterForm};

const SUMMARY_CHARS: usize = 150;

pub fn render<T: Template>(page: &T) -> Result<RawHtml<String>, PortalError> {
    Ok(RawHtml(page.render()?))
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%B %d, %Y").to_string()
}

fn upload_url(stored: &str) -> String {
    format!("/uploads/{}", stored)
}

/// Navigation and flash slot shared by every page
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub logged_in: bool,
    pub username: String,
    pub is_employer: bool,
    pub is_job_seeker: bool,
    pub flash_kind: String,
    pub flash_message: String,
}

impl Layout {
    pub fn new(user: Option<&User>, flash: Option<FlashMessage<'_>>) -> Self {
        let mut layout = match user {
            Some(user) => Self {
                logged_in: true,
                username: user.username.clone(),
                is_employer: user.is_employer(),
                is_job_seeker: user.is_job_seeker(),
                ..Self::default()
            },
            None => Self::default(),
        };

        if let Some(flash) = flash {
            layout.flash_kind = alert_class(flash.kind()).to_string();
            layout.flash_message = flash.message().to_string();
        }
        layout
    }

    pub fn has_flash(&self) -> bool {
        !self.flash_message.is_empty()
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.flash_kind = "danger".to_string();
        self.flash_message = message.into();
        self
    }
}

fn alert_class(kind: &str) -> &'static str {
    match kind {
        "success" => "success",
        "warning" => "warning",
        "error" | "danger" => "danger",
        _ => "info",
    }
}

#[derive(Debug, Clone)]
pub struct JobCard {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub summary: String,
    pub posted: String,
}

impl From<&Job> for JobCard {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            summary: truncate_chars(&job.description, SUMMARY_CHARS),
            posted: format_date(&job.date_posted),
        }
    }
}

fn cards(jobs: &[Job]) -> Vec<JobCard> {
    jobs.iter().map(JobCard::from).collect()
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub layout: Layout,
    pub jobs: Vec<JobCard>,
}

impl IndexPage {
    pub fn new(layout: Layout, jobs: &[Job]) -> Self {
        Self {
            layout,
            jobs: cards(jobs),
        }
    }
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub layout: Layout,
    pub form: RegisterForm,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub email: String,
    pub next: String,
}

#[derive(Template)]
#[template(path = "jobs.html")]
pub struct JobsPage {
    pub layout: Layout,
    pub jobs: Vec<JobCard>,
    pub search: String,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_url: String,
    pub next_url: String,
}

impl JobsPage {
    pub fn new(layout: Layout, search: &str, listing: &Paginated<Job>) -> Self {
        let page_url = |page: i64| {
            if search.is_empty() {
                format!("/jobs?page={}", page)
            } else {
                format!(
                    "/jobs?search={}&page={}",
                    percent_encoding::utf8_percent_encode(
                        search,
                        percent_encoding::NON_ALPHANUMERIC
                    ),
                    page
                )
            }
        };

        Self {
            layout,
            jobs: cards(&listing.items),
            search: search.to_string(),
            page: listing.page,
            pages: listing.pages(),
            total: listing.total,
            has_prev: listing.has_prev(),
            has_next: listing.has_next(),
            prev_url: page_url(listing.page - 1),
            next_url: page_url(listing.page + 1),
        }
    }
}

#[derive(Template)]
#[template(path = "job_detail.html")]
pub struct JobDetailPage {
    pub layout: Layout,
    pub job: JobCard,
    pub description: String,
    pub requirements: String,
    pub is_owner: bool,
    pub can_apply: bool,
    pub already_applied: bool,
}

impl JobDetailPage {
    pub fn new(layout: Layout, job: &Job, viewer: Option<&User>, already_applied: bool) -> Self {
        let is_owner = viewer.map(|user| job.is_owned_by(user.id)).unwrap_or(false);
        let can_apply = viewer.map(User::is_job_seeker).unwrap_or(true) && !already_applied;

        Self {
            layout,
            job: JobCard::from(job),
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            is_owner,
            can_apply,
            already_applied,
        }
    }
}

#[derive(Template)]
#[template(path = "job_form.html")]
pub struct JobFormPage {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub form: JobForm,
}

impl JobFormPage {
    pub fn post(layout: Layout, form: JobForm) -> Self {
        Self {
            layout,
            heading: "Post a New Job".to_string(),
            action: "/post_job".to_string(),
            submit_label: "Post Job".to_string(),
            form,
        }
    }

    pub fn edit(layout: Layout, job_id: i64, form: JobForm) -> Self {
        Self {
            layout,
            heading: "Edit Job".to_string(),
            action: format!("/job/{}/edit", job_id),
            submit_label: "Update Job".to_string(),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "apply.html")]
pub struct ApplyPage {
    pub layout: Layout,
    pub job: JobCard,
    pub cover_letter: String,
    pub accept: String,
    pub allowed: String,
    pub max_megabytes: u64,
}

impl ApplyPage {
    pub fn new(
        layout: Layout,
        job: &Job,
        cover_letter: String,
        allowed_extensions: &[String],
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            layout,
            job: JobCard::from(job),
            cover_letter,
            accept: allowed_extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(","),
            allowed: allowed_extensions.join(", "),
            max_megabytes: max_upload_bytes / (1024 * 1024),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicantRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    pub has_resume: bool,
    pub resume_url: String,
    pub applied: String,
}

impl From<&ApplicantEntry> for ApplicantRow {
    fn from(entry: &ApplicantEntry) -> Self {
        Self {
            name: entry.applicant_name.clone(),
            email: entry.applicant_email.clone(),
            phone: entry.applicant_phone.clone(),
            cover_letter: entry.cover_letter.clone(),
            has_resume: entry.resume_path.is_some(),
            resume_url: entry.resume_path.as_deref().map(upload_url).unwrap_or_default(),
            applied: format_date(&entry.date_applied),
        }
    }
}

#[derive(Template)]
#[template(path = "applications.html")]
pub struct ApplicationsPage {
    pub layout: Layout,
    pub job: JobCard,
    pub applications: Vec<ApplicantRow>,
}

impl ApplicationsPage {
    pub fn new(layout: Layout, job: &Job, entries: &[ApplicantEntry]) -> Self {
        Self {
            layout,
            job: JobCard::from(job),
            applications: entries.iter().map(ApplicantRow::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostedJobRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted: String,
    pub application_count: i64,
}

impl From<&EmployerJobSummary> for PostedJobRow {
    fn from(summary: &EmployerJobSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            company: summary.company.clone(),
            location: summary.location.clone(),
            posted: format_date(&summary.date_posted),
            application_count: summary.application_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedRow {
    pub job_id: i64,
    pub job_title: String,
    pub company: String,
    pub has_resume: bool,
    pub resume_url: String,
    pub applied: String,
}

impl From<&SubmittedApplication> for SubmittedRow {
    fn from(application: &SubmittedApplication) -> Self {
        Self {
            job_id: application.job_id,
            job_title: application.job_title.clone(),
            company: application.company.clone(),
            has_resume: application.resume_path.is_some(),
            resume_url: application
                .resume_path
                .as_deref()
                .map(upload_url)
                .unwrap_or_default(),
            applied: format_date(&application.date_applied),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub layout: Layout,
    pub full_name: String,
    pub account_label: String,
    pub posted_jobs: Vec<PostedJobRow>,
    pub applications: Vec<SubmittedRow>,
}

impl DashboardPage {
    pub fn for_employer(layout: Layout, user: &User, jobs: &[EmployerJobSummary]) -> Self {
        Self {
            layout,
            full_name: user.full_name.clone(),
            account_label: user.user_type.label().to_string(),
            posted_jobs: jobs.iter().map(PostedJobRow::from).collect(),
            applications: Vec::new(),
        }
    }

    pub fn for_job_seeker(
        layout: Layout,
        user: &User,
        applications: &[SubmittedApplication],
    ) -> Self {
        Self {
            layout,
            full_name: user.full_name.clone(),
            account_label: user.user_type.label().to_string(),
            posted_jobs: Vec::new(),
            applications: applications.iter().map(SubmittedRow::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl ErrorPage {
    pub fn new(layout: Layout, status: Status, message: String) -> Self {
        Self {
            layout,
            code: status.code,
            reason: status.reason().unwrap_or("Error").to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job() -> Job {
        Job {
            id: 7,
            title: "Test Job".to_string(),
            description: "d".repeat(200),
            requirements: String::new(),
            location: "Test Location".to_string(),
            salary: "$50,000 - $70,000".to_string(),
            company: "Test Company".to_string(),
            employer_id: 1,
            date_posted: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_job_card_summary_and_date() {
        let card = JobCard::from(&job());
        assert_eq!(card.posted, "March 05, 2024");
        assert!(card.summary.ends_with("..."));
        assert_eq!(card.summary.chars().count(), SUMMARY_CHARS + 3);
    }

    #[test]
    fn test_jobs_page_links_keep_search() {
        let listing = Paginated {
            items: vec![job()],
            page: 2,
            per_page: 1,
            total: 3,
        };
        let page = JobsPage::new(Layout::default(), "rust dev", &listing);
        assert_eq!(page.prev_url, "/jobs?search=rust%20dev&page=1");
        assert_eq!(page.next_url, "/jobs?search=rust%20dev&page=3");
        assert!(page.has_prev && page.has_next);
    }

    #[test]
    fn test_error_page_renders_message_escaped() {
        let page = ErrorPage::new(
            Layout::default(),
            Status::Forbidden,
            "<b>nope</b>".to_string(),
        );
        let html = render(&page).unwrap().0;
        assert!(html.contains("403"));
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
    }

    #[test]
    fn test_layout_error_flash() {
        let layout = Layout::default().with_error("Passwords must match.");
        assert!(layout.has_flash());
        assert_eq!(layout.flash_kind, "danger");
    }
}
