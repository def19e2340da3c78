// src/web/types.rs

use rocket::data::Capped;
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect, Responder};
use serde::Serialize;

use crate::core::jobs::{Job, JobDraft};
use crate::core::users::UserType;
use crate::error::PortalError;
use crate::utils::is_valid_email;

const USERNAME_MIN_CHARS: usize = 2;
const USERNAME_MAX_CHARS: usize = 20;
const PASSWORD_MIN_CHARS: usize = 6;
const JOB_TITLE_MAX_CHARS: usize = 100;

/// Every page handler answers with one of these
#[derive(Responder)]
pub enum Reply {
    Page(RawHtml<String>),
    Rejected((Status, RawHtml<String>)),
    Redirect(Redirect),
    Flash(Flash<Redirect>),
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

fn required(value: &str, label: &str) -> Result<String, PortalError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::Validation(format!("{} is required.", label)));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct RegisterForm {
    #[field(default = String::new())]
    pub username: String,
    #[field(default = String::new())]
    pub email: String,
    #[field(default = String::new())]
    pub password: String,
    #[field(default = String::new())]
    pub confirm_password: String,
    #[field(default = String::new())]
    pub user_type: String,
    #[field(default = String::new())]
    pub full_name: String,
    #[field(default = String::new())]
    pub phone: String,
}

/// A registration that passed every field check
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    pub full_name: String,
    pub phone: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, PortalError> {
        let username = required(&self.username, "Username")?;
        let username_len = username.chars().count();
        if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&username_len) {
            return Err(PortalError::Validation(format!(
                "Username must be between {} and {} characters long.",
                USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
            )));
        }

        let email = required(&self.email, "Email")?.to_lowercase();
        if !is_valid_email(&email) {
            return Err(PortalError::Validation("Invalid email address.".to_string()));
        }

        if self.password.is_empty() {
            return Err(PortalError::Validation("Password is required.".to_string()));
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(PortalError::Validation(format!(
                "Password must be at least {} characters long.",
                PASSWORD_MIN_CHARS
            )));
        }
        if self.confirm_password.is_empty() {
            return Err(PortalError::Validation(
                "Please confirm your password.".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(PortalError::Validation("Passwords must match.".to_string()));
        }

        let user_type = required(&self.user_type, "Account type")?
            .parse::<UserType>()
            .map_err(|_| {
                PortalError::Validation(
                    "Account type must be either job seeker or employer.".to_string(),
                )
            })?;

        let full_name = required(&self.full_name, "Full name")?;

        Ok(Registration {
            username,
            email,
            password: self.password.clone(),
            user_type,
            full_name,
            phone: self.phone.trim().to_string(),
        })
    }

    pub fn is_employer(&self) -> bool {
        self.user_type == UserType::Employer.as_str()
    }
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct LoginForm {
    #[field(default = String::new())]
    pub email: String,
    #[field(default = String::new())]
    pub password: String,
    #[field(default = false)]
    pub remember: bool,
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, PortalError> {
        let email = required(&self.email, "Email")?.to_lowercase();
        if self.password.is_empty() {
            return Err(PortalError::Validation("Password is required.".to_string()));
        }

        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct JobForm {
    #[field(default = String::new())]
    pub title: String,
    #[field(default = String::new())]
    pub description: String,
    #[field(default = String::new())]
    pub requirements: String,
    #[field(default = String::new())]
    pub location: String,
    #[field(default = String::new())]
    pub salary: String,
    #[field(default = String::new())]
    pub company: String,
}

impl JobForm {
    pub fn to_draft(&self) -> Result<JobDraft, PortalError> {
        let title = required(&self.title, "Job title")?;
        if title.chars().count() > JOB_TITLE_MAX_CHARS {
            return Err(PortalError::Validation(format!(
                "Job title must be at most {} characters long.",
                JOB_TITLE_MAX_CHARS
            )));
        }

        Ok(JobDraft {
            title,
            description: required(&self.description, "Job description")?,
            requirements: self.requirements.trim().to_string(),
            location: required(&self.location, "Location")?,
            salary: self.salary.trim().to_string(),
            company: required(&self.company, "Company name")?,
        })
    }
}

impl From<&Job> for JobForm {
    fn from(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            company: job.company.clone(),
        }
    }
}

#[derive(FromForm)]
pub struct ApplyForm<'r> {
    #[field(default = String::new())]
    pub cover_letter: String,
    pub resume: Option<Capped<TempFile<'r>>>,
}

impl ApplyForm<'_> {
    pub fn cover_letter(&self) -> Result<String, PortalError> {
        required(&self.cover_letter, "Cover letter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterForm {
        RegisterForm {
            username: "newuser".to_string(),
            email: " NewUser@Example.com ".to_string(),
            password: "newpass123".to_string(),
            confirm_password: "newpass123".to_string(),
            user_type: "job_seeker".to_string(),
            full_name: "New User".to_string(),
            phone: String::new(),
        }
    }

    fn rejection(form: &RegisterForm) -> String {
        match form.validate() {
            Err(PortalError::Validation(msg)) => msg,
            other => panic!("expected a validation error, got {:?}", other.map(|r| r.username)),
        }
    }

    #[test]
    fn test_valid_registration() {
        let registration = registration().validate().unwrap();
        assert_eq!(registration.email, "newuser@example.com");
        assert_eq!(registration.user_type, UserType::JobSeeker);
        assert_eq!(registration.phone, "");
    }

    #[test]
    fn test_registration_rules() {
        let mut form = registration();
        form.confirm_password = "different".to_string();
        assert_eq!(rejection(&form), "Passwords must match.");

        let mut form = registration();
        form.username = "x".to_string();
        assert!(rejection(&form).contains("between 2 and 20"));

        let mut form = registration();
        form.email = "not-an-email".to_string();
        assert_eq!(rejection(&form), "Invalid email address.");

        let mut form = registration();
        form.password = "short".to_string();
        form.confirm_password = "short".to_string();
        assert!(rejection(&form).contains("at least 6"));

        let mut form = registration();
        form.user_type = "admin".to_string();
        assert!(rejection(&form).contains("Account type"));

        let mut form = registration();
        form.full_name = "   ".to_string();
        assert_eq!(rejection(&form), "Full name is required.");
    }

    #[test]
    fn test_login_form_normalizes_email() {
        let form = LoginForm {
            email: "Test_Seeker@Example.com".to_string(),
            password: "testpass".to_string(),
            ..<LoginForm as Default>::default()
        };
        assert_eq!(form.validate().unwrap().email, "test_seeker@example.com");

        let empty = <LoginForm as Default>::default();
        assert!(matches!(empty.validate(), Err(PortalError::Validation(_))));
    }

    #[test]
    fn test_job_form_validation() {
        let form = JobForm {
            title: " New Test Job ".to_string(),
            description: "New test job description".to_string(),
            location: "New Test Location".to_string(),
            company: "New Test Company".to_string(),
            ..<JobForm as Default>::default()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.title, "New Test Job");
        assert_eq!(draft.salary, "");

        let long = JobForm {
            title: "t".repeat(101),
            ..form.clone()
        };
        assert!(matches!(long.to_draft(), Err(PortalError::Validation(_))));

        let missing_company = JobForm {
            company: String::new(),
            ..form
        };
        match missing_company.to_draft() {
            Err(PortalError::Validation(msg)) => assert_eq!(msg, "Company name is required."),
            _ => panic!("missing company should be rejected"),
        }
    }
}
