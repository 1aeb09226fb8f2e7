use axum::{extract::State, http::StatusCode};

use crate::domain::repository::Storage;
use crate::state::AppState;

/// Handler for `GET /readyz`: 200 while the storage backend answers.
pub async fn readyz<S: Storage>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "storage not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
