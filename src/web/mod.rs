// src/web/mod.rs

pub mod handlers;
pub mod types;
pub mod views;

pub use types::*;

use crate::auth::{session_state, AuthError, CurrentUser, Employer, JobSeeker, OptionalUser};
use crate::core::{ConfigManager, Database, PortalConfig};
use crate::error::{ErrorReply, PortalError};
use anyhow::{anyhow, Result};
use rocket::config::{LogLevel, SecretKey};
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::fs::{FileServer, Options};
use rocket::http::{CookieJar, Status};
use rocket::request::FlashMessage;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, Request, Response, Rocket, State};
use tracing::{info, warn};

// Request logging fairing
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Log every request with its response status",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let status = response.status();
        if status.code >= 500 {
            warn!("{} {} -> {}", request.method(), request.uri(), status);
        } else {
            info!("{} {} -> {}", request.method(), request.uri(), status);
        }
    }
}

// Pages

#[get("/")]
pub async fn index(
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::index_handler(user, flash, db).await
}

#[get("/register")]
pub async fn register_page(
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    handlers::register_page_handler(user, flash).await
}

#[post("/register", data = "<form>")]
pub async fn register(
    form: Form<RegisterForm>,
    user: OptionalUser,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::register_handler(form, user, db, config).await
}

#[get("/login?<next>")]
pub async fn login_page(
    next: Option<String>,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    handlers::login_page_handler(next, user, flash).await
}

#[post("/login", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::login_handler(form, cookies, db, config).await
}

#[get("/logout")]
pub async fn logout(
    user: Result<CurrentUser, AuthError>,
    cookies: &CookieJar<'_>,
) -> Result<Reply, PortalError> {
    handlers::logout_handler(user, cookies).await
}

#[get("/jobs?<search>&<page>")]
pub async fn jobs(
    search: Option<String>,
    page: Option<i64>,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::jobs_handler(search, page, user, flash, db, config).await
}

#[get("/job/<job_id>")]
pub async fn job_detail(
    job_id: i64,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::job_detail_handler(job_id, user, flash, db).await
}

#[get("/post_job")]
pub async fn post_job_page(
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    handlers::post_job_page_handler(employer, flash).await
}

#[post("/post_job", data = "<form>")]
pub async fn post_job(
    form: Form<JobForm>,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::post_job_handler(form, employer, db).await
}

#[get("/job/<job_id>/edit")]
pub async fn edit_job_page(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::edit_job_page_handler(job_id, employer, flash, db).await
}

#[post("/job/<job_id>/edit", data = "<form>")]
pub async fn edit_job(
    job_id: i64,
    form: Form<JobForm>,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::edit_job_handler(job_id, form, employer, db).await
}

#[post("/job/<job_id>/delete")]
pub async fn delete_job(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::delete_job_handler(job_id, employer, db, config).await
}

#[get("/job/<job_id>/applications")]
pub async fn job_applications(
    job_id: i64,
    employer: Result<Employer, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::applications_handler(job_id, employer, flash, db).await
}

#[get("/apply/<job_id>")]
pub async fn apply_page(
    job_id: i64,
    seeker: Result<JobSeeker, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::apply_page_handler(job_id, seeker, flash, db, config).await
}

#[post("/apply/<job_id>", data = "<form>")]
pub async fn apply(
    job_id: i64,
    form: Form<ApplyForm<'_>>,
    seeker: Result<JobSeeker, AuthError>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    handlers::apply_handler(job_id, form, seeker, db, config).await
}

#[get("/dashboard")]
pub async fn dashboard(
    user: Result<CurrentUser, AuthError>,
    flash: Option<FlashMessage<'_>>,
    db: &State<Database>,
) -> Result<Reply, PortalError> {
    handlers::dashboard_handler(user, flash, db).await
}

#[get("/health")]
pub async fn health(db: &State<Database>) -> (Status, Json<HealthResponse>) {
    handlers::health_handler(db).await
}

// Error catchers

#[catch(404)]
pub async fn not_found(req: &Request<'_>) -> ErrorReply {
    session_state(req).await;
    ErrorReply::new(
        Status::NotFound,
        "The page you are looking for does not exist.",
    )
}

#[catch(413)]
pub async fn payload_too_large(req: &Request<'_>) -> ErrorReply {
    session_state(req).await;
    ErrorReply::new(
        Status::PayloadTooLarge,
        "The uploaded data is too large.",
    )
}

#[catch(422)]
pub async fn unprocessable(req: &Request<'_>) -> ErrorReply {
    session_state(req).await;
    ErrorReply::new(
        Status::UnprocessableEntity,
        "The submitted form could not be understood. Please try again.",
    )
}

#[catch(500)]
pub fn internal_error() -> ErrorReply {
    ErrorReply::new(
        Status::InternalServerError,
        "Something went wrong on our side. Please try again later.",
    )
}

/// Assemble the application: storage, managed state, routes, catchers and file serving
pub async fn build_rocket(config: ConfigManager) -> Result<Rocket<Build>> {
    config.ensure_directories().await?;
    let db = Database::connect(&config.database_url).await?;

    let limits = Limits::default()
        .limit("file", config.portal.max_upload_bytes.bytes())
        .limit("data-form", 20.mebibytes());

    let rocket_config = rocket::Config {
        address: config.server.host,
        port: config.server.port,
        secret_key: SecretKey::derive_from(config.server.secret_key.as_bytes()),
        limits,
        log_level: LogLevel::Off,
        ..rocket::Config::default()
    };

    let upload_dir = config.portal.upload_dir.clone();

    Ok(rocket::custom(rocket_config)
        .attach(RequestLogger)
        .manage(db)
        .manage(config.portal)
        .register(
            "/",
            catchers![not_found, payload_too_large, unprocessable, internal_error],
        )
        .mount(
            "/",
            routes![
                index,
                register_page,
                register,
                login_page,
                login,
                logout,
                jobs,
                job_detail,
                post_job_page,
                post_job,
                edit_job_page,
                edit_job,
                delete_job,
                job_applications,
                apply_page,
                apply,
                dashboard,
                health,
            ],
        )
        .mount("/uploads", FileServer::new(upload_dir, Options::None)))
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let profile = config.profile;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let database_url = config.database_url.clone();
    let upload_dir = config.portal.upload_dir.clone();

    let rocket = build_rocket(config).await?;

    info!("Starting Job Portal ({} profile)", profile.as_str());
    info!("Database: {}", database_url);
    info!("Uploads: {}", upload_dir.display());
    info!("Listening on http://{}", address);

    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Web server failed: {}", e))?;

    Ok(())
}
