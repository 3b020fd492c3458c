pub use crate::auth::{
    AuthError, Authenticator, Credentials, FooterLink, LoginForm, Navigator, RegisterForm,
    RegistrationProfile, Route,
};
pub use crate::config::{AppConfig, DashboardConfig, ValidationConfig};
pub use crate::dashboard::{Account, AccountType, Budget, Dashboard, Transaction};
pub use crate::form::{
    FieldLens, FormController, FormModel, FormOptions, Schema, SubmitError, SubmitOutcome,
    SubmitState, ValidationMode, ValidationResult, rules,
};
pub use crate::i18n::{I18nManager, Locale};
pub use crate::session::{
    AuthenticatedProfile, GuestSession, InMemorySession, SessionProvider, SessionStore,
};
