use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthenticatedProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl AuthenticatedProfile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Source of the signed-in user, injected into pages that greet or gate on it.
pub trait SessionProvider: Send + Sync + 'static {
    fn current_profile(&self) -> Option<AuthenticatedProfile>;

    fn is_authenticated(&self) -> bool {
        self.current_profile().is_some()
    }
}

pub trait SessionStore: SessionProvider {
    fn store(&self, profile: AuthenticatedProfile);
    fn clear(&self);
}

/// Always signed out.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuestSession;

impl SessionProvider for GuestSession {
    fn current_profile(&self) -> Option<AuthenticatedProfile> {
        None
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemorySession {
    state: Arc<RwLock<Option<AuthenticatedProfile>>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(profile: AuthenticatedProfile) -> Self {
        Self {
            state: Arc::new(RwLock::new(Some(profile))),
        }
    }
}

impl SessionProvider for InMemorySession {
    fn current_profile(&self) -> Option<AuthenticatedProfile> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.clone()
    }
}

impl SessionStore for InMemorySession {
    fn store(&self, profile: AuthenticatedProfile) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        log::debug!("session opened for {}", profile.email);
        *state = Some(profile);
    }

    fn clear(&self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = None;
    }
}
