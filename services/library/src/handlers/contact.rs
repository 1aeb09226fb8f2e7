use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use gcmn_auth_types::session::Session;

use crate::domain::repository::Storage;
use crate::domain::types::ContactMessage;
use crate::error::LibraryServiceError;
use crate::handlers::{Success, success};
use crate::policy::require_admin;
use crate::state::AppState;
use crate::usecase::contact::{
    DeleteMessageUseCase, ListMessagesUseCase, MarkMessageSeenUseCase, SendMessageInput,
    SendMessageUseCase,
};

// ── GET /contact-messages ────────────────────────────────────────────────────

pub async fn list_messages<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ContactMessage>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListMessagesUseCase { repo: state.repo() };
    Ok(Json(usecase.execute().await?))
}

// ── POST /contact-messages ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

pub async fn send_message<S: Storage>(
    State(state): State<AppState<S>>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), LibraryServiceError> {
    let usecase = SendMessageUseCase { repo: state.repo() };
    let message = usecase
        .execute(SendMessageInput {
            name: body.name,
            email: body.email,
            subject: body.subject,
            message: body.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

// ── PATCH /contact-messages/{id}/seen ────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenRequest {
    pub is_seen: Option<bool>,
}

pub async fn mark_seen<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(body): Json<SeenRequest>,
) -> Result<Json<ContactMessage>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let seen = body
        .is_seen
        .ok_or(LibraryServiceError::MissingField("isSeen"))?;
    let usecase = MarkMessageSeenUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id, seen).await?))
}

// ── DELETE /contact-messages/{id} ────────────────────────────────────────────

pub async fn delete_message<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    DeleteMessageUseCase { repo: state.repo() }
        .execute(&id)
        .await?;
    Ok(success())
}
