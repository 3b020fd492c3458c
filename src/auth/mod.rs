mod login;
mod model;
mod register;
mod schemas;
mod service;

#[cfg(test)]
mod tests;

pub use login::LoginForm;
pub use model::{Credentials, RegistrationProfile};
pub use register::RegisterForm;
pub use schemas::{login_schema, registration_schema};
pub use service::{AuthError, Authenticator, FooterLink, Navigator, Route};
