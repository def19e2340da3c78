// src/web/handlers/auth_handlers.rs
use rocket::form::Form;
use rocket::http::{CookieJar, Status};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use tracing::info;

use crate::auth::{end_session, start_session, AuthError, AuthService, CurrentUser, OptionalUser};
use crate::core::{Database, PortalConfig};
use crate::error::PortalError;
use crate::utils::safe_redirect_target;
use crate::web::handlers::{page, rejected};
use crate::web::types::{LoginForm, RegisterForm, Reply};
use crate::web::views::{Layout, LoginPage, RegisterPage};

fn already_logged_in() -> Result<Reply, PortalError> {
    Ok(Reply::Redirect(Redirect::to("/")))
}

pub async fn register_page_handler(
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    if user.0.is_some() {
        return already_logged_in();
    }

    page(&RegisterPage {
        layout: Layout::new(None, flash),
        form: RegisterForm::default(),
    })
}

pub async fn register_handler(
    form: Form<RegisterForm>,
    user: OptionalUser,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    if user.0.is_some() {
        return already_logged_in();
    }

    let mut form = form.into_inner();
    match AuthService::new(db, config).register(&form).await {
        Ok(user) => Ok(Reply::Flash(Flash::success(
            Redirect::to("/login"),
            format!(
                "Account created for {}! You can now log in.",
                user.username
            ),
        ))),
        Err(PortalError::Validation(message)) => {
            form.password.clear();
            form.confirm_password.clear();
            rejected(
                Status::BadRequest,
                &RegisterPage {
                    layout: Layout::new(None, None).with_error(message),
                    form,
                },
            )
        }
        Err(e) => Err(e),
    }
}

pub async fn login_page_handler(
    next: Option<String>,
    user: OptionalUser,
    flash: Option<FlashMessage<'_>>,
) -> Result<Reply, PortalError> {
    if user.0.is_some() {
        return already_logged_in();
    }

    page(&LoginPage {
        layout: Layout::new(None, flash),
        email: String::new(),
        next: safe_redirect_target(next.as_deref()).unwrap_or_default(),
    })
}

pub async fn login_handler(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    db: &State<Database>,
    config: &State<PortalConfig>,
) -> Result<Reply, PortalError> {
    let form = form.into_inner();
    let next = safe_redirect_target(form.next.as_deref());

    let failure = match AuthService::new(db, config).authenticate(&form).await {
        Ok(user) => {
            start_session(cookies, &user, config.session_lifetime, form.remember);
            let target = next.unwrap_or_else(|| "/".to_string());
            return Ok(Reply::Flash(Flash::success(
                Redirect::to(target),
                "You have been logged in!",
            )));
        }
        Err(e @ PortalError::Auth(_)) | Err(e @ PortalError::Validation(_)) => e,
        Err(e) => return Err(e),
    };

    rejected(
        failure.status(),
        &LoginPage {
            layout: Layout::new(None, None).with_error(failure.to_string()),
            email: form.email,
            next: next.unwrap_or_default(),
        },
    )
}

pub async fn logout_handler(
    user: Result<CurrentUser, AuthError>,
    cookies: &CookieJar<'_>,
) -> Result<Reply, PortalError> {
    let CurrentUser(user) = user?;

    end_session(cookies);
    info!("User {} logged out", user.id);

    Ok(Reply::Flash(Flash::new(
        Redirect::to("/"),
        "info",
        "You have been logged out.",
    )))
}
