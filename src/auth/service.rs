use futures::future::BoxFuture;
use thiserror::Error;

use super::model::{Credentials, RegistrationProfile};
use crate::form::SubmitError;
use crate::session::AuthenticatedProfile;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

impl From<AuthError> for SubmitError {
    fn from(error: AuthError) -> Self {
        SubmitError::new(error.to_string())
    }
}

/// Backend side of the auth forms. How it talks to the server is up to the
/// implementation.
pub trait Authenticator: Send + Sync + 'static {
    fn login(
        &self,
        credentials: Credentials,
    ) -> BoxFuture<'static, Result<AuthenticatedProfile, AuthError>>;

    fn register(&self, profile: RegistrationProfile) -> BoxFuture<'static, Result<(), AuthError>>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }
}

/// Footer link under an auth form pointing at the other form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FooterLink {
    pub prompt: String,
    pub label: String,
    pub route: Route,
}

pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: Route);
}
