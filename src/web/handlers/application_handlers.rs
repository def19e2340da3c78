// src/web/handlers/application_handlers.rs
use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use tracing::info;

use crate::auth::{AuthError, CurrentUser, Employer, JobSeeker};
use crate::core::applications::{ApplicationRepository, NewApplication};
use crate::core::jobs::{Job, JobRepository};
use crate::core::{Database, PortalConfig};
use crate::error::PortalError;
use crate::uploads::{discard_resumes, store_resume};
use crate::web::handlers::job_handlers::load_owned_job;
use crate::web::handlers::{page, rejected};
use crate::web::types::{ApplyForm, Reply};
use crate::web::views::{ApplicationsPage, ApplyPage, DashboardPage, Layout};

const ALREADY_APPLIED: &str = "You have already applied for this job.";

async fn find_job(db: &Database, job_id: i64) -> Result<Job, PortalError> {
    JobRepository::new(db.pool())
        .find_by_id(job_id)
        .await?
        .ok_or_else(PortalError::job_not_found)
}

fn already_applied(job_id: i64) -> Reply {
    Reply::Flash(Flash::new(
        Redirect::to(format!("/job/{}", job_id)),
        "info",
        ALREADY_APPLIED,
    ))
}

pub async fn apply_page_handler(
    job_id: i64,
    seeker: Result<JobSeeker, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    let JobSeeker(user) = seeker?;
    let job = find_job(db, job_id).await?;

    if ApplicationRepository::new(db.pool())
        .exists_for(job.id, user.id)
        .await?
    {
        return Ok(already_applied(job.id));
    }

    page(&ApplyPage::new(
        Layout::new(Some(&user), flash),
        &job,
        String::new(),
        &config.allowed_extensions,
        config.max_upload_bytes,
    ))
}

pub async fn apply_handler(
    job_id: i64,
    form: Form<ApplyForm<'_>>,
    seeker: Result<JobSeeker, AuthError>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    let JobSeeker(user) = seeker?;
    let job = find_job(db, job_id).await?;
    let mut form = form.into_inner();
    let applications = ApplicationRepository::new(db.pool());

    let send_back = |message: String, cover_letter: String| {
        rejected(
            Status::BadRequest,
            &ApplyPage::new(
                Layout::new(Some(&user), None).with_error(message),
                &job,
                cover_letter,
                &config.allowed_extensions,
                config.max_upload_bytes,
            ),
        )
    };

    let cover_letter = match form.cover_letter() {
        Ok(cover_letter) => cover_letter,
        Err(PortalError::Validation(message)) => return send_back(message, String::new()),
        Err(e) => return Err(e),
    };

    if applications.exists_for(job.id, user.id).await? {
        return send_back(ALREADY_APPLIED.to_string(), cover_letter);
    }

    let resume_path = match store_resume(config, form.resume.as_mut()).await {
        Ok(stored) => stored,
        Err(PortalError::Validation(message)) => return send_back(message, cover_letter),
        Err(e) => return Err(e),
    };

    let new_application = NewApplication {
        job_id: job.id,
        user_id: user.id,
        cover_letter,
        resume_path,
    };

    if let Err(e) = applications.create(&new_application).await {
        discard_resumes(config, new_application.resume_path.iter()).await;
        return match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                send_back(ALREADY_APPLIED.to_string(), new_application.cover_letter)
            }
            e => Err(e.into()),
        };
    }

    Ok(Reply::Flash(Flash::success(
        Redirect::to("/dashboard"),
        format!("Your application for {} has been submitted!", job.title),
    )))
}

pub async fn applications_handler(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    let job = load_owned_job(db, job_id, &user).await?;

    let entries = ApplicationRepository::new(db.pool())
        .list_for_job(job.id)
        .await?;
    info!(
        "Employer {} reviewed {} application(s) for job {}",
        user.id,
        entries.len(),
        job.id
    );

    page(&ApplicationsPage::new(
        Layout::new(Some(&user), flash),
        &job,
        &entries,
    ))
}

pub async fn dashboard_handler(
    user: Result<CurrentUser, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let CurrentUser(user) = user?;
    let layout = Layout::new(Some(&user), flash);

    let dashboard = if user.is_employer() {
        let jobs = JobRepository::new(db.pool())
            .list_for_employer(user.id)
            .await?;
        DashboardPage::for_employer(layout, &user, &jobs)
    } else {
        let applications = ApplicationRepository::new(db.pool())
            .list_for_user(user.id)
            .await?;
        DashboardPage::for_job_seeker(layout, &user, &applications)
    };

    page(&dashboard)
}
