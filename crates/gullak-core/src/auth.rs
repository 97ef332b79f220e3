//! Session management
//!
//! [`AuthService`] is the identity-provider seam: credential operations
//! plus a broadcast of session transitions. Consumers hold a
//! [`SessionWatcher`] and rebuild their view state on every change they
//! observe; they never cache a session beyond the current value.
//!
//! [`LocalAuth`] is the bundled in-process implementation backing the CLI
//! and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::models::Session;

/// An authentication failure, carrying the provider's message verbatim.
///
/// The message is shown to the user unmodified, so providers phrase it
/// for display.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct AuthError(pub String);

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        AuthError(message.into())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// The identity-provider seam.
///
/// `watch_sessions` hands out a receiver seeded with the current session;
/// every sign-in and sign-out publishes the new session to all receivers.
pub trait AuthService: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>)
        -> AuthResult<Session>;

    fn sign_out(&self);

    fn send_password_reset(&self, email: &str) -> AuthResult<()>;

    fn watch_sessions(&self) -> watch::Receiver<Session>;
}

struct RegisteredUser {
    id: String,
    password: String,
    display_name: Option<String>,
}

/// In-process [`AuthService`] with a registered-user table.
pub struct LocalAuth {
    users: Mutex<HashMap<String, RegisteredUser>>,
    sessions: watch::Sender<Session>,
}

impl LocalAuth {
    pub fn new() -> Self {
        let (sessions, _) = watch::channel(Session::Guest);
        Self {
            users: Mutex::new(HashMap::new()),
            sessions,
        }
    }

    /// Register a user without signing them in. Used to seed tests and
    /// the CLI's local account.
    pub fn with_user(self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        self.users.lock().unwrap().insert(
            email.to_string(),
            RegisteredUser {
                id: Uuid::new_v4().to_string(),
                password: password.to_string(),
                display_name: display_name.map(str::to_string),
            },
        );
        self
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthService for LocalAuth {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(email)
            .filter(|u| u.password == password)
            .ok_or_else(|| AuthError::new("Invalid email or password."))?;

        let session = Session::authenticated(&user.id, email, user.display_name.clone());
        drop(users);

        info!(email, "signed in");
        self.sessions.send_replace(session.clone());
        Ok(session)
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Session> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(AuthError::new(
                "An account with this email already exists.",
            ));
        }

        let id = Uuid::new_v4().to_string();
        users.insert(
            email.to_string(),
            RegisteredUser {
                id: id.clone(),
                password: password.to_string(),
                display_name: display_name.map(str::to_string),
            },
        );
        drop(users);

        let session = Session::authenticated(id, email, display_name.map(str::to_string));
        info!(email, "signed up");
        self.sessions.send_replace(session.clone());
        Ok(session)
    }

    fn sign_out(&self) {
        info!("signed out");
        self.sessions.send_replace(Session::Guest);
    }

    fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        let users = self.users.lock().unwrap();
        if !users.contains_key(email) {
            return Err(AuthError::new("No account found for this email."));
        }
        info!(email, "password reset requested");
        Ok(())
    }

    fn watch_sessions(&self) -> watch::Receiver<Session> {
        self.sessions.subscribe()
    }
}

/// Consumer-side handle on the session stream.
///
/// `current` reads the latest session; `changed` awaits the next
/// transition. Both mark the value seen, so a controller loop drives
/// entirely off `changed`.
pub struct SessionWatcher {
    rx: watch::Receiver<Session>,
}

impl SessionWatcher {
    pub fn new(rx: watch::Receiver<Session>) -> Self {
        Self { rx }
    }

    /// The latest session, marking it seen.
    pub fn current(&mut self) -> Session {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next session transition. Returns `None` once the
    /// provider has gone away.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
