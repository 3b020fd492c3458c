use std::sync::Arc;

use super::model::RegistrationProfile;
use super::schemas::registration_schema;
use super::service::{Authenticator, FooterLink, Navigator, Route};
use crate::config::AppConfig;
use crate::form::{
    FormController, FormOptions, FormResult, FormSnapshot, SubmitError, SubmitOutcome,
};
use crate::i18n::I18nManager;

/// Sign-up form. New accounts still need activation, so a successful submit
/// sends the user to the sign-in page rather than opening a session.
pub struct RegisterForm {
    controller: FormController<RegistrationProfile>,
    authenticator: Arc<dyn Authenticator>,
    navigator: Arc<dyn Navigator>,
    i18n: I18nManager,
}

impl RegisterForm {
    pub fn new(
        config: &AppConfig,
        i18n: I18nManager,
        authenticator: Arc<dyn Authenticator>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let schema = registration_schema(&config.validation, i18n.clone());
        let options = FormOptions {
            validate_mode: config.validation.mode,
        };
        Self {
            controller: FormController::new(RegistrationProfile::default(), schema, options),
            authenticator,
            navigator,
            i18n,
        }
    }

    pub fn controller(&self) -> &FormController<RegistrationProfile> {
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
            "auth.sign_up"
        };
        Ok(self.i18n.t(key))
    }

    pub fn subtitle(&self) -> String {
        self.i18n.t("auth.details")
    }

    pub fn footer(&self) -> FooterLink {
        FooterLink {
            prompt: self.i18n.t("auth.have_account"),
            label: self.i18n.t("auth.sign_in_link"),
            route: Route::Login,
        }
    }

    pub fn follow_footer(&self) {
        self.navigator.navigate(Route::Login);
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<RegistrationProfile>> {
        self.controller.snapshot()
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        let authenticator = self.authenticator.clone();
        let outcome = self
            .controller
            .submit(move |profile| async move {
                authenticator.register(profile).await?;
                Ok::<(), SubmitError>(())
            })
            .await?;

        if outcome == SubmitOutcome::Succeeded {
            log::info!("registered, navigating to {}", Route::Login.path());
            self.navigator.navigate(Route::Login);
        }
        Ok(outcome)
    }
}
