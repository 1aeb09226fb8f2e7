use axum::extract::FromRef;

use gcmn_auth_types::session::SessionKey;

use crate::domain::repository::Storage;
use crate::usecase::account::AdminCredentials;
use crate::usecase::card_application::SubmissionGate;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub store: S,
    pub submissions: SubmissionGate,
    pub session_key: SessionKey,
    pub admin: AdminCredentials,
    pub cookie_domain: Option<String>,
}

impl<S: Storage> AppState<S> {
    pub fn new(
        store: S,
        session_key: SessionKey,
        admin: AdminCredentials,
        cookie_domain: Option<String>,
    ) -> Self {
        Self {
            store,
            submissions: SubmissionGate::new(),
            session_key,
            admin,
            cookie_domain,
        }
    }

    pub fn repo(&self) -> S {
        self.store.clone()
    }
}

impl<S: Storage> FromRef<AppState<S>> for SessionKey {
    fn from_ref(state: &AppState<S>) -> Self {
        state.session_key.clone()
    }
}
