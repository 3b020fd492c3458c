use super::*;
use crate::config::AppConfig;
use crate::form::{ErrorCode, FieldLens, FormError, FormModel, SubmitOutcome};
use crate::i18n::I18nManager;
use crate::session::{AuthenticatedProfile, InMemorySession, SessionProvider};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingAuthenticator {
    logins: Mutex<Vec<Credentials>>,
    registrations: Mutex<Vec<RegistrationProfile>>,
    failure: Option<AuthError>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl RecordingAuthenticator {
    fn failing(error: AuthError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    fn gated(gate: oneshot::Receiver<()>) -> Self {
        Self {
            gate: Mutex::new(Some(gate)),
            ..Self::default()
        }
    }

    fn login_calls(&self) -> Vec<Credentials> {
        self.logins.lock().expect("logins lock").clone()
    }

    fn registration_calls(&self) -> Vec<RegistrationProfile> {
        self.registrations.lock().expect("registrations lock").clone()
    }

    fn outcome<T: Send + 'static>(&self, value: T) -> BoxFuture<'static, Result<T, AuthError>> {
        let failure = self.failure.clone();
        let gate = self.gate.lock().expect("gate lock").take();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match failure {
                Some(error) => Err(error),
                None => Ok(value),
            }
        }
        .boxed()
    }
}

impl Authenticator for RecordingAuthenticator {
    fn login(
        &self,
        credentials: Credentials,
    ) -> BoxFuture<'static, Result<AuthenticatedProfile, AuthError>> {
        let profile = AuthenticatedProfile::new("Yves", "Martin", credentials.email.clone());
        self.logins.lock().expect("logins lock").push(credentials);
        self.outcome(profile)
    }

    fn register(&self, profile: RegistrationProfile) -> BoxFuture<'static, Result<(), AuthError>> {
        self.registrations
            .lock()
            .expect("registrations lock")
            .push(profile);
        self.outcome(())
    }
}

#[derive(Default)]
struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes lock").push(route);
    }
}

struct LoginHarness {
    form: LoginForm,
    authenticator: Arc<RecordingAuthenticator>,
    session: Arc<InMemorySession>,
    navigator: Arc<RecordingNavigator>,
}

fn login_harness(authenticator: RecordingAuthenticator, locale: &str) -> LoginHarness {
    let authenticator = Arc::new(authenticator);
    let session = Arc::new(InMemorySession::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = LoginForm::new(
        &AppConfig::default(),
        I18nManager::with_locale(locale),
        authenticator.clone(),
        session.clone(),
        navigator.clone(),
    );
    LoginHarness {
        form,
        authenticator,
        session,
        navigator,
    }
}

struct RegisterHarness {
    form: RegisterForm,
    authenticator: Arc<RecordingAuthenticator>,
    navigator: Arc<RecordingNavigator>,
}

fn register_harness(authenticator: RecordingAuthenticator) -> RegisterHarness {
    let authenticator = Arc::new(authenticator);
    let navigator = Arc::new(RecordingNavigator::default());
    let form = RegisterForm::new(
        &AppConfig::default(),
        I18nManager::with_locale("en"),
        authenticator.clone(),
        navigator.clone(),
    );
    RegisterHarness {
        form,
        authenticator,
        navigator,
    }
}

fn fill(form: &RegisterForm, values: &[(&str, &str)]) {
    for (name, value) in values {
        form.set_field(name, *value).expect("known registration field");
    }
}

const VALID_REGISTRATION: [(&str, &str); 5] = [
    ("first_name", "Yves"),
    ("last_name", "Martin"),
    ("email", "yves@example.com"),
    ("password", "abcdefg"),
    ("re_password", "abcdefg"),
];

#[test]
fn valid_login_submits_once_and_opens_session() {
    let harness = login_harness(RecordingAuthenticator::default(), "en");
    harness.form.set_field("email", "a@b.com").expect("email");
    harness.form.set_field("password", "secret1").expect("password");

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(
        harness.authenticator.login_calls(),
        vec![Credentials::new("a@b.com", "secret1")]
    );
    assert_eq!(
        harness
            .session
            .current_profile()
            .map(|profile| profile.email),
        Some("a@b.com".to_string())
    );
    assert_eq!(harness.navigator.routes(), vec![Route::Home]);
    assert!(!harness.form.is_loading().expect("loading flag"));
}

#[test]
fn login_with_missing_password_never_calls_backend() {
    let harness = login_harness(RecordingAuthenticator::default(), "en");
    harness.form.set_field("email", "a@b.com").expect("email");

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(harness.authenticator.login_calls().is_empty());
    assert!(harness.navigator.routes().is_empty());
    let snapshot = harness.form.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.result.error_fields(),
        vec![Credentials::fields().password().key()]
    );
    assert_eq!(
        harness.form.visible_error("password").expect("display"),
        Some("Password is required".to_string())
    );
}

#[test]
fn short_login_password_reports_length_policy() {
    let harness = login_harness(RecordingAuthenticator::default(), "en");
    harness.form.set_field("email", "a@b.com").expect("email");
    harness.form.set_field("password", "12345").expect("password");
    harness.form.touch("password").expect("blur");

    assert_eq!(
        harness.form.visible_error("password").expect("display"),
        Some("Password must be at least 6 characters".to_string())
    );
}

#[test]
fn login_errors_follow_the_selected_locale() {
    let harness = login_harness(RecordingAuthenticator::default(), "fr-FR");
    harness.form.set_field("email", "pas-un-email").expect("email");
    harness.form.touch("email").expect("blur");

    assert_eq!(
        harness.form.visible_error("email").expect("display"),
        Some("Veuillez saisir une adresse e-mail valide".to_string())
    );
    assert_eq!(harness.form.submit_label().expect("label"), "Se connecter");
}

#[test]
fn backend_failure_becomes_failed_outcome_and_form_stays_usable() {
    let harness = login_harness(
        RecordingAuthenticator::failing(AuthError::InvalidCredentials),
        "en",
    );
    harness.form.set_field("email", "a@b.com").expect("email");
    harness.form.set_field("password", "secret1").expect("password");

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(
        outcome,
        SubmitOutcome::Failed("invalid email or password".to_string())
    );
    assert_eq!(harness.authenticator.login_calls().len(), 1);
    assert!(harness.session.current_profile().is_none());
    assert!(harness.navigator.routes().is_empty());
    let snapshot = harness.form.snapshot().expect("snapshot");
    assert!(snapshot.is_valid);
    assert_eq!(snapshot.submit_state, crate::form::SubmitState::Idle);
}

#[test]
fn submit_label_shows_loading_while_pending() {
    let (release, gate) = oneshot::channel();
    let harness = login_harness(RecordingAuthenticator::gated(gate), "en");
    harness.form.set_field("email", "a@b.com").expect("email");
    harness.form.set_field("password", "secret1").expect("password");
    assert_eq!(harness.form.submit_label().expect("label"), "Sign In");

    block_on(async {
        let mut pending = Box::pin(harness.form.submit());
        assert!(futures::poll!(pending.as_mut()).is_pending());
        assert!(harness.form.is_loading().expect("loading flag"));
        assert_eq!(harness.form.submit_label().expect("label"), "Loading...");

        let duplicate = harness.form.submit().await.expect("duplicate submit");
        assert_eq!(duplicate, SubmitOutcome::Ignored);

        release.send(()).expect("gate still open");
        assert_eq!(
            pending.await.expect("pending submit"),
            SubmitOutcome::Succeeded
        );
    });

    assert_eq!(harness.authenticator.login_calls().len(), 1);
    assert_eq!(harness.form.submit_label().expect("label"), "Sign In");
}

#[test]
fn unknown_field_name_is_rejected() {
    let harness = login_harness(RecordingAuthenticator::default(), "en");
    assert_eq!(
        harness.form.set_field("username", "yves"),
        Err(FormError::UnknownField("username".to_string()))
    );
}

#[test]
fn complete_registration_is_valid_and_navigates_to_login() {
    let harness = register_harness(RecordingAuthenticator::default());
    fill(&harness.form, &VALID_REGISTRATION);

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Succeeded);
    let calls = harness.authenticator.registration_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].email, "yves@example.com");
    assert_eq!(calls[0].re_password, "abcdefg");
    assert_eq!(harness.navigator.routes(), vec![Route::Login]);
}

#[test]
fn registration_mismatch_blocks_submission() {
    let harness = register_harness(RecordingAuthenticator::default());
    fill(&harness.form, &VALID_REGISTRATION);
    harness
        .form
        .set_field("re_password", "abcdefh")
        .expect("confirmation");

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(harness.authenticator.registration_calls().is_empty());
    let result = harness.form.snapshot().expect("snapshot").result;
    assert_eq!(
        result.error_fields(),
        vec![RegistrationProfile::fields().re_password().key()]
    );
    assert_eq!(
        result.message("re_password"),
        Some("Confirm password must match Password")
    );
}

#[test]
fn each_missing_registration_field_is_reported_alone() {
    for (missing, _) in VALID_REGISTRATION {
        let schema = registration_schema(
            &AppConfig::default().validation,
            I18nManager::with_locale("en"),
        );
        let mut profile = RegistrationProfile {
            first_name: "Yves".to_string(),
            last_name: "Martin".to_string(),
            email: "yves@example.com".to_string(),
            password: "abcdefg".to_string(),
            re_password: "abcdefg".to_string(),
        };
        if let Some(slot) = profile.text_field_mut(missing) {
            slot.clear();
        }

        let result = schema.evaluate(&profile);
        let fields = result
            .error_fields()
            .into_iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(fields, vec![missing], "missing {missing}");
        assert_eq!(
            result.error(missing).map(|error| error.code().clone()),
            Some(ErrorCode::Required)
        );
    }
}

#[test]
fn equal_passwords_below_policy_report_length_not_mismatch() {
    let schema = registration_schema(
        &AppConfig::default().validation,
        I18nManager::with_locale("en"),
    );
    let profile = RegistrationProfile {
        first_name: "Yves".to_string(),
        last_name: "Martin".to_string(),
        email: "yves@example.com".to_string(),
        password: "abc".to_string(),
        re_password: "abc".to_string(),
    };

    let result = schema.evaluate(&profile);
    assert_eq!(
        result.error("password").map(|error| error.code().clone()),
        Some(ErrorCode::TooShort { min: 6 })
    );
    assert!(result.error("re_password").is_none());
}

#[test]
fn debug_output_redacts_passwords() {
    let credentials = Credentials::new("a@b.com", "secret1");
    let rendered = format!("{credentials:?}");
    assert!(rendered.contains("a@b.com"));
    assert!(!rendered.contains("secret1"));

    let profile = RegistrationProfile {
        password: "abcdefg".to_string(),
        re_password: "abcdefh".to_string(),
        ..RegistrationProfile::default()
    };
    let rendered = format!("{profile:?}");
    assert!(!rendered.contains("abcdefg"));
    assert!(!rendered.contains("abcdefh"));
}

#[test]
fn routes_map_to_paths() {
    assert_eq!(Route::Home.path(), "/");
    assert_eq!(Route::Login.path(), "/login");
    assert_eq!(Route::Register.path(), "/register");
}

#[test]
fn padded_email_is_rejected_before_reaching_backend() {
    let harness = login_harness(RecordingAuthenticator::default(), "en");
    harness.form.set_field("email", "  a@b.com ").expect("email");
    harness.form.set_field("password", "secret1").expect("password");

    let outcome = block_on(harness.form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(harness.authenticator.login_calls().is_empty());
    assert_eq!(
        harness.form.visible_error("email").expect("display"),
        Some("Please enter a valid email address".to_string())
    );
}

#[test]
fn forms_expose_subtitle_and_cross_links() {
    let login = login_harness(RecordingAuthenticator::default(), "en");
    assert_eq!(login.form.subtitle(), "Please enter your details");
    assert_eq!(
        login.form.footer(),
        FooterLink {
            prompt: "Don't have an account?".to_string(),
            label: "Sign up".to_string(),
            route: Route::Register,
        }
    );
    login.form.follow_footer();
    assert_eq!(login.navigator.routes(), vec![Route::Register]);

    let register = register_harness(RecordingAuthenticator::default());
    assert_eq!(register.form.footer().route, Route::Login);
    assert_eq!(register.form.footer().label, "Sign in");
    register.form.follow_footer();
    assert_eq!(register.navigator.routes(), vec![Route::Login]);
}
