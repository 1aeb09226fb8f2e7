use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use gcmn_auth_types::session::Session;
use gcmn_domain::status::UserKind;

use crate::domain::repository::Storage;
use crate::domain::types::{BookBorrow, CardApplication, User};
use crate::error::LibraryServiceError;
use crate::policy::require_admin;
use crate::state::AppState;
use crate::usecase::admin::{DirectoryUseCase, StatsUseCase};
use crate::usecase::borrow::ListBorrowsUseCase;
use crate::usecase::card_application::ListApplicationsUseCase;

/// A user as shown to admins. The password hash never leaves the store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            roll_number: user.roll_number,
            department: user.department,
            student_class: user.student_class,
            kind: user.kind,
            created_at: user.created_at,
        }
    }
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub students: Vec<UserView>,
    pub non_students: Vec<UserView>,
}

pub async fn list_users<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<UsersResponse>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let directory = DirectoryUseCase { repo: state.repo() }.execute().await?;
    Ok(Json(UsersResponse {
        students: directory.students.into_iter().map(Into::into).collect(),
        non_students: directory.non_students.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /admin/library-cards ─────────────────────────────────────────────────

pub async fn list_library_cards<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<CardApplication>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListApplicationsUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(None).await?))
}

// ── GET /admin/borrowed-books ────────────────────────────────────────────────

pub async fn list_borrowed_books<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<BookBorrow>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListBorrowsUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(None).await?))
}

// ── GET /admin/stats ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: usize,
    pub total_books: usize,
    pub library_cards: usize,
    pub borrowed_books: usize,
    pub returned_books: usize,
    pub donations: usize,
}

pub async fn stats<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<StatsResponse>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let stats = StatsUseCase { repo: state.repo() }.execute().await?;
    Ok(Json(StatsResponse {
        total_users: stats.total_users,
        total_books: stats.total_borrows,
        library_cards: stats.library_cards,
        borrowed_books: stats.borrowed_books,
        returned_books: stats.returned_books,
        donations: stats.donations,
    }))
}
