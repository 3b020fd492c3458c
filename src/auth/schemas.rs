use super::model::{Credentials, RegistrationProfile};
use crate::config::ValidationConfig;
use crate::form::{FormModel, Schema, rules};
use crate::i18n::I18nManager;

pub fn login_schema(config: &ValidationConfig, i18n: I18nManager) -> Schema<Credentials> {
    let fields = Credentials::fields();
    Schema::new("login", i18n)
        .field(fields.email(), [rules::required(), rules::email()])
        .field(
            fields.password(),
            [
                rules::required(),
                rules::min_length(config.password_min_length),
            ],
        )
}

pub fn registration_schema(
    config: &ValidationConfig,
    i18n: I18nManager,
) -> Schema<RegistrationProfile> {
    let fields = RegistrationProfile::fields();
    Schema::new("register", i18n)
        .field(fields.first_name(), [rules::required()])
        .field(fields.last_name(), [rules::required()])
        .field(fields.email(), [rules::required(), rules::email()])
        .field(
            fields.password(),
            [
                rules::required(),
                rules::min_length(config.password_min_length),
            ],
        )
        .field(fields.re_password(), [rules::required()])
        .must_match(fields.re_password(), fields.password())
}
