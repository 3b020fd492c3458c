use std::sync::Arc;

use super::model::Credentials;
use super::schemas::login_schema;
use super::service::{Authenticator, FooterLink, Navigator, Route};
use crate::config::AppConfig;
use crate::form::{
    FormController, FormOptions, FormResult, FormSnapshot, SubmitError, SubmitOutcome,
};
use crate::i18n::I18nManager;
use crate::session::SessionStore;

/// Sign-in form. A successful submit stores the returned profile in the
/// session and navigates home.
pub struct LoginForm {
    controller: FormController<Credentials>,
    authenticator: Arc<dyn Authenticator>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    i18n: I18nManager,
}

impl LoginForm {
    pub fn new(
        config: &AppConfig,
        i18n: I18nManager,
        authenticator: Arc<dyn Authenticator>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let schema = login_schema(&config.validation, i18n.clone());
        let options = FormOptions {
            validate_mode: config.validation.mode,
        };
        Self {
            controller: FormController::new(Credentials::default(), schema, options),
            authenticator,
            session,
            navigator,
            i18n,
        }
    }

    pub fn controller(&self) -> &FormController<Credentials> {
        &self.controller
    }

    pub fn set_field(&self, name: &str, value: impl Into<String>) -> FormResult<()> {
        self.controller.set_text(name, value)
    }

    pub fn touch(&self, name: &str) -> FormResult<()> {
        self.controller.touch_by_name(name)
    }

    pub fn visible_error(&self, name: &str) -> FormResult<Option<String>> {
        self.controller.visible_error_by_name(name)
    }

    pub fn is_loading(&self) -> FormResult<bool> {
        self.controller.is_submitting()
    }

    pub fn submit_label(&self) -> FormResult<String> {
        let key = if self.is_loading()? {
            "auth.loading"
        } else {
            "auth.sign_in"
        };
        Ok(self.i18n.t(key))
    }

    pub fn subtitle(&self) -> String {
        self.i18n.t("auth.details")
    }

    pub fn footer(&self) -> FooterLink {
        FooterLink {
            prompt: self.i18n.t("auth.no_account"),
            label: self.i18n.t("auth.sign_up_link"),
            route: Route::Register,
        }
    }

    pub fn follow_footer(&self) {
        self.navigator.navigate(Route::Register);
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<Credentials>> {
        self.controller.snapshot()
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        let authenticator = self.authenticator.clone();
        let session = self.session.clone();
        let outcome = self
            .controller
            .submit(move |credentials| async move {
                let profile = authenticator.login(credentials).await?;
                session.store(profile);
                Ok::<(), SubmitError>(())
            })
            .await?;

        if outcome == SubmitOutcome::Succeeded {
            log::info!("signed in, navigating to {}", Route::Home.path());
            self.navigator.navigate(Route::Home);
        }
        Ok(outcome)
    }
}
