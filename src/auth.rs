// src/auth.rs
use crate::core::users::{NewUser, User, UserRepository, UserType};
use crate::core::{Database, PortalConfig};
use crate::error::PortalError;
use crate::web::types::{LoginForm, RegisterForm};
use anyhow::{Context, Result};
use chrono::Utc;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use std::time::Duration;
use tracing::{error, info, warn};

pub const SESSION_COOKIE: &str = "portal_session";

/// Clock skew tolerated on the issue timestamp of a session
const MAX_FUTURE_SKEW_SECS: i64 = 60;

pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .context("Password verification task failed")?
        .context("Stored password hash is malformed")
}

/// Payload of the private session cookie: `<user id>:<issued at, unix seconds>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: i64,
    pub issued_at: i64,
}

impl SessionToken {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            issued_at: Utc::now().timestamp(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.user_id, self.issued_at)
    }

    pub fn decode(value: &str) -> Option<Self> {
        let (user_id, issued_at) = value.split_once(':')?;
        Some(Self {
            user_id: user_id.parse().ok()?,
            issued_at: issued_at.parse().ok()?,
        })
    }

    pub fn is_expired(&self, lifetime: Duration, now: i64) -> bool {
        let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(self.issued_at) > lifetime
            || self.issued_at > now.saturating_add(MAX_FUTURE_SKEW_SECS)
    }
}

/// Bind the browser to `user`. With `remember` the cookie outlives the browser session.
pub fn start_session(cookies: &CookieJar<'_>, user: &User, lifetime: Duration, remember: bool) {
    let mut cookie = Cookie::build((SESSION_COOKIE, SessionToken::new(user.id).encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    if remember {
        let seconds = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
        cookie = cookie.max_age(rocket::time::Duration::seconds(seconds));
    }

    cookies.add_private(cookie);
    info!("Session started for user {}", user.id);
}

pub fn end_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(SESSION_COOKIE);
}

/// Per-request memo of the session lookup, shared by every guard and error page
#[derive(Debug, Clone)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
    Unavailable,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

async fn resolve_session(req: &Request<'_>) -> SessionState {
    let db = match req.guard::<&State<Database>>().await {
        Outcome::Success(db) => db,
        _ => {
            error!("Database state is not managed");
            return SessionState::Unavailable;
        }
    };

    let config = match req.guard::<&State<PortalConfig>>().await {
        Outcome::Success(config) => config,
        _ => {
            error!("Portal configuration is not managed");
            return SessionState::Unavailable;
        }
    };

    let cookies = req.cookies();
    let token = match cookies
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| SessionToken::decode(cookie.value()))
    {
        Some(token) => token,
        None => return SessionState::Anonymous,
    };

    if token.is_expired(config.session_lifetime, Utc::now().timestamp()) {
        info!("Session for user {} expired", token.user_id);
        end_session(cookies);
        return SessionState::Anonymous;
    }

    match UserRepository::new(db.pool()).find_by_id(token.user_id).await {
        Ok(Some(user)) => SessionState::Authenticated(user),
        Ok(None) => {
            warn!("Session references missing user {}", token.user_id);
            end_session(cookies);
            SessionState::Anonymous
        }
        Err(e) => {
            error!("Failed to load session user {}: {}", token.user_id, e);
            SessionState::Unavailable
        }
    }
}

/// Session state for this request, resolving it on first use
pub async fn session_state<'r>(req: &'r Request<'_>) -> &'r SessionState {
    req.local_cache_async(resolve_session(req)).await
}

#[derive(Debug)]
pub enum AuthError {
    NotLoggedIn,
    WrongRole(UserType),
    SessionUnavailable,
}

/// Logged-in user of any role
pub struct CurrentUser(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match session_state(req).await {
            SessionState::Authenticated(user) => Outcome::Success(CurrentUser(user.clone())),
            SessionState::Anonymous => Outcome::Error((Status::Unauthorized, AuthError::NotLoggedIn)),
            SessionState::Unavailable => Outcome::Error((
                Status::InternalServerError,
                AuthError::SessionUnavailable,
            )),
        }
    }
}

// Optional auth guard that doesn't fail if no session is present
pub struct OptionalUser(pub Option<User>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(OptionalUser(session_state(req).await.user().cloned()))
    }
}

async fn require_role<'r>(req: &'r Request<'_>, role: UserType) -> Outcome<User, AuthError> {
    match CurrentUser::from_request(req).await {
        Outcome::Success(CurrentUser(user)) if user.user_type == role => Outcome::Success(user),
        Outcome::Success(CurrentUser(user)) => {
            warn!(
                "User {} ({}) denied access to {} reserved for {}",
                user.id,
                user.user_type,
                req.uri(),
                role
            );
            Outcome::Error((Status::Forbidden, AuthError::WrongRole(role)))
        }
        Outcome::Error(e) => Outcome::Error(e),
        Outcome::Forward(f) => Outcome::Forward(f),
    }
}

/// Logged-in user with the employer role
pub struct Employer(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Employer {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        require_role(req, UserType::Employer).await.map(Employer)
    }
}

/// Logged-in user with the job seeker role
pub struct JobSeeker(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for JobSeeker {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        require_role(req, UserType::JobSeeker).await.map(JobSeeker)
    }
}

/// Registration and credential checks against the users table
pub struct AuthService<'a> {
    repo: UserRepository<'a>,
    config: &'a PortalConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database, config: &'a PortalConfig) -> Self {
        Self {
            repo: UserRepository::new(db.pool()),
            config,
        }
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<User, PortalError> {
        let registration = form.validate()?;

        if self.repo.username_taken(&registration.username).await? {
            return Err(PortalError::Validation(
                "That username is taken. Please choose a different one.".to_string(),
            ));
        }
        if self.repo.email_taken(&registration.email).await? {
            return Err(PortalError::Validation(
                "That email is already registered. Please use a different one.".to_string(),
            ));
        }

        let password_hash = hash_password(&registration.password, self.config.bcrypt_cost).await?;

        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            user_type: registration.user_type,
            full_name: registration.full_name,
            phone: registration.phone,
        };

        match self.repo.create(&new_user).await {
            Ok(user) => Ok(user),
            // A concurrent registration won the race for the same name or email.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                PortalError::Validation("That username or email is already registered.".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn authenticate(&self, form: &LoginForm) -> Result<User, PortalError> {
        let credentials = form.validate()?;

        let user = match self.repo.find_by_email(&credentials.email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(invalid_credentials());
            }
        };

        if !verify_password(&credentials.password, &user.password_hash).await? {
            warn!("Failed login for user {}", user.id);
            return Err(invalid_credentials());
        }

        info!("User {} logged in", user.id);
        Ok(user)
    }
}

fn invalid_credentials() -> PortalError {
    PortalError::Auth("Login unsuccessful. Please check email and password.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_round_trip() {
        let token = SessionToken {
            user_id: 42,
            issued_at: 1_700_000_000,
        };
        assert_eq!(token.encode(), "42:1700000000");
        assert_eq!(SessionToken::decode("42:1700000000"), Some(token));
        assert_eq!(SessionToken::decode("42"), None);
        assert_eq!(SessionToken::decode("abc:1"), None);
    }

    #[test]
    fn test_session_expiry() {
        let lifetime = Duration::from_secs(7 * 24 * 60 * 60);
        let token = SessionToken {
            user_id: 1,
            issued_at: 1_000_000,
        };

        assert!(!token.is_expired(lifetime, 1_000_000));
        assert!(!token.is_expired(lifetime, 1_000_000 + 604_800));
        assert!(token.is_expired(lifetime, 1_000_000 + 604_801));
        assert!(token.is_expired(lifetime, 1_000_000 - 3_600));
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let hash = hash_password("testpass", 4).await.unwrap();
        assert_ne!(hash, "testpass");
        assert!(verify_password("testpass", &hash).await.unwrap());
        assert!(!verify_password("wrongpass", &hash).await.unwrap());
    }
}
