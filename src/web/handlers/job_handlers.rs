// src/web/handlers/job_handlers.rs
use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use tracing::{info, warn};

use crate::auth::{AuthError, Employer, OptionalUser};
use crate::core::applications::ApplicationRepository;
use crate::core::jobs::{Job, JobRepository};
use crate::core::users::User;
use crate::core::{Database, PortalConfig};
use crate::error::PortalError;
use crate::uploads::discard_resumes;
use crate::web::handlers::{page, rejected};
use crate::web::types::{JobForm, Reply};
use crate::web::views::{IndexPage, JobDetailPage, JobFormPage, JobsPage, Layout};

const RECENT_JOBS: i64 = 5;

/// Load a job the employer is allowed to manage
pub(crate) async fn load_owned_job(db: &Database, job_id: i64, user: &User) -> Result<Job, PortalError> {
    let job = JobRepository::new(db.pool())
        .find_by_id(job_id)
        .await?
        .ok_or_else(PortalError::job_not_found)?;

    if !job.is_owned_by(user.id) {
        warn!(
            "User {} attempted to manage job {} owned by {}",
            user.id, job.id, job.employer_id
        );
        return Err(PortalError::Authorization(
            "You can only manage your own job postings.".to_string(),
        ));
    }

    Ok(job)
}

pub async fn index_handler(
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let jobs = JobRepository::new(db.pool()).recent(RECENT_JOBS).await?;
    page(&IndexPage::new(Layout::new(user.0.as_ref(), flash), &jobs))
}

pub async fn jobs_handler(
    search: Option<String>,
    page_number: Option<i64>,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    let search = search.unwrap_or_default().trim().to_string();
    let term = (!search.is_empty()).then_some(search.as_str());
    let page_number = page_number.unwrap_or(1);

    let listing = JobRepository::new(db.pool())
        .search(term, page_number, config.jobs_per_page)
        .await?;

    if listing.is_out_of_range() {
        return Err(PortalError::NotFound(format!(
            "Page {} of the job listings does not exist.",
            page_number
        )));
    }

    page(&JobsPage::new(
        Layout::new(user.0.as_ref(), flash),
        &search,
        &listing,
    ))
}

pub async fn job_detail_handler(
    job_id: i64,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let job = JobRepository::new(db.pool())
        .find_by_id(job_id)
        .await?
        .ok_or_else(PortalError::job_not_found)?;

    let viewer = user.0.as_ref();
    let already_applied = match viewer {
        Some(user) if user.is_job_seeker() => {
            ApplicationRepository::new(db.pool())
                .exists_for(job.id, user.id)
                .await?
        }
        _ => false,
    };

    page(&JobDetailPage::new(
        Layout::new(viewer, flash),
        &job,
        viewer,
        already_applied,
    ))
}

pub async fn post_job_page_handler(
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    page(&JobFormPage::post(
        Layout::new(Some(&user), flash),
        JobForm::default(),
    ))
}

pub async fn post_job_handler(
    form: Form<JobForm>,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    let form = form.into_inner();

    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(PortalError::Validation(message)) => {
            return rejected(
                Status::BadRequest,
                &JobFormPage::post(Layout::new(Some(&user), None).with_error(message), form),
            );
        }
        Err(e) => return Err(e),
    };

    let job = JobRepository::new(db.pool()).create(user.id, &draft).await?;

    Ok(Reply::Flash(Flash::success(
        Redirect::to(format!("/job/{}", job.id)),
        "Job posted successfully!",
    )))
}

pub async fn edit_job_page_handler(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    let job = load_owned_job(db, job_id, &user).await?;

    page(&JobFormPage::edit(
        Layout::new(Some(&user), flash),
        job.id,
        JobForm::from(&job),
    ))
}

pub async fn edit_job_handler(
    job_id: i64,
    form: Form<JobForm>,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    let job = load_owned_job(db, job_id, &user).await?;
    let form = form.into_inner();

    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(PortalError::Validation(message)) => {
            return rejected(
                Status::BadRequest,
                &JobFormPage::edit(
                    Layout::new(Some(&user), None).with_error(message),
                    job.id,
                    form,
                ),
            );
        }
        Err(e) => return Err(e),
    };

    if !JobRepository::new(db.pool()).update(job.id, &draft).await? {
        return Err(PortalError::job_not_found());
    }

    Ok(Reply::Flash(Flash::success(
        Redirect::to(format!("/job/{}", job.id)),
        "Job updated successfully!",
    )))
}

pub async fn delete_job_handler(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    let Employer(user) = employer?;
    let job = load_owned_job(db, job_id, &user).await?;

    let resumes = JobRepository::new(db.pool()).delete(job.id).await?;
    discard_resumes(config, &resumes).await;
    info!(
        "User {} deleted job {} ({} resume file(s) removed)",
        user.id,
        job.id,
        resumes.len()
    );

    Ok(Reply::Flash(Flash::success(
        Redirect::to("/dashboard"),
        format!("Job '{}' has been deleted.", job.title),
    )))
}
