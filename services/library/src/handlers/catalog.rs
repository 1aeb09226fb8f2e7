use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use gcmn_auth_types::session::Session;
use gcmn_domain::status::{PublishStatus, UnknownStatus};

use crate::domain::repository::Storage;
use crate::domain::types::{Note, NotePatch, RareBook};
use crate::error::LibraryServiceError;
use crate::handlers::{Success, success};
use crate::policy::require_admin;
use crate::state::AppState;
use crate::usecase::catalog::{
    CreateNoteInput, CreateNoteUseCase, CreateRareBookInput, CreateRareBookUseCase,
    DeleteNoteUseCase, DeleteRareBookUseCase, FilterNotesUseCase, ListNotesUseCase,
    ListRareBooksUseCase, ToggleNoteUseCase, ToggleRareBookUseCase, UpdateNoteUseCase,
};

fn parse_publish_status(value: Option<String>) -> Result<Option<PublishStatus>, UnknownStatus> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse())
        .transpose()
}

// ── GET /notes ───────────────────────────────────────────────────────────────

pub async fn list_active_notes<S: Storage>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Note>>, LibraryServiceError> {
    let usecase = ListNotesUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(false).await?))
}

// ── GET /notes/filter ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NoteFilterQuery {
    pub class: Option<String>,
    pub subject: Option<String>,
}

pub async fn filter_notes<S: Storage>(
    State(state): State<AppState<S>>,
    Query(query): Query<NoteFilterQuery>,
) -> Result<Json<Vec<Note>>, LibraryServiceError> {
    let usecase = FilterNotesUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(query.class, query.subject).await?))
}

// ── GET /admin/notes ─────────────────────────────────────────────────────────

pub async fn list_notes<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Note>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListNotesUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(true).await?))
}

// ── POST /admin/notes ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<String>,
}

pub async fn create_note<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let input = CreateNoteInput {
        class_name: body.class_name,
        subject: body.subject,
        title: body.title,
        description: body.description,
        pdf_path: body.pdf_path,
        status: parse_publish_status(body.status)?,
    };
    let note = CreateNoteUseCase { repo: state.repo() }
        .execute(input)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

// ── PATCH /admin/notes/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<String>,
}

pub async fn update_note<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let patch = NotePatch {
        class_name: body.class_name,
        subject: body.subject,
        title: body.title,
        description: body.description,
        pdf_path: body.pdf_path,
        status: parse_publish_status(body.status)?,
    };
    let usecase = UpdateNoteUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id, patch).await?))
}

// ── PATCH /admin/notes/{id}/toggle ───────────────────────────────────────────

pub async fn toggle_note<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Note>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ToggleNoteUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id).await?))
}

// ── DELETE /admin/notes/{id} ─────────────────────────────────────────────────

pub async fn delete_note<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    DeleteNoteUseCase { repo: state.repo() }.execute(&id).await?;
    Ok(success())
}

// ── GET /rare-books ──────────────────────────────────────────────────────────

pub async fn list_active_rare_books<S: Storage>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<RareBook>>, LibraryServiceError> {
    let usecase = ListRareBooksUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(false).await?))
}

// ── GET /admin/rare-books ────────────────────────────────────────────────────

pub async fn list_rare_books<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<RareBook>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListRareBooksUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(true).await?))
}

// ── POST /admin/rare-books ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRareBookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<String>,
}

pub async fn create_rare_book<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Json(body): Json<CreateRareBookRequest>,
) -> Result<(StatusCode, Json<RareBook>), LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let input = CreateRareBookInput {
        title: body.title,
        description: body.description,
        category: body.category,
        pdf_path: body.pdf_path,
        status: parse_publish_status(body.status)?,
    };
    let book = CreateRareBookUseCase { repo: state.repo() }
        .execute(input)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

// ── PATCH /admin/rare-books/{id}/toggle ──────────────────────────────────────

pub async fn toggle_rare_book<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<RareBook>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ToggleRareBookUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id).await?))
}

// ── DELETE /admin/rare-books/{id} ────────────────────────────────────────────

pub async fn delete_rare_book<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    DeleteRareBookUseCase { repo: state.repo() }
        .execute(&id)
        .await?;
    Ok(success())
}
