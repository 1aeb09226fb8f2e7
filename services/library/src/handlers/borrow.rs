use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use gcmn_auth_types::session::Session;
use gcmn_domain::status::BorrowStatus;

use crate::domain::repository::Storage;
use crate::domain::types::BookBorrow;
use crate::error::LibraryServiceError;
use crate::handlers::parse_timestamp;
use crate::policy::{owner_scope, require_admin};
use crate::state::AppState;
use crate::usecase::borrow::{
    BorrowBookInput, BorrowBookUseCase, ListBorrowsUseCase, UpdateBorrowStatusUseCase,
};

// ── GET /book-borrows ────────────────────────────────────────────────────────

/// Admins see every loan; everyone else sees their own.
pub async fn list_borrows<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<BookBorrow>>, LibraryServiceError> {
    let scope = owner_scope(&state.store, &principal).await?;
    let usecase = ListBorrowsUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(scope.as_deref()).await?))
}

// ── POST /book-borrows ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_title: Option<String>,
    pub isbn: Option<String>,
    pub borrow_date: Option<String>,
    pub due_date: Option<String>,
}

pub async fn borrow_book<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Json(body): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<BookBorrow>), LibraryServiceError> {
    let input = BorrowBookInput {
        book_title: body.book_title,
        isbn: body.isbn,
        borrow_date: parse_timestamp("borrowDate", body.borrow_date)?,
        due_date: parse_timestamp("dueDate", body.due_date)?,
    };
    let usecase = BorrowBookUseCase { repo: state.repo() };
    let borrow = usecase.execute(principal.subject(), input).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

// ── PATCH /book-borrows/{id}/status ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowStatusRequest {
    pub status: Option<String>,
    pub return_date: Option<String>,
}

pub async fn update_status<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(body): Json<BorrowStatusRequest>,
) -> Result<Json<BookBorrow>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let status: BorrowStatus = body
        .status
        .ok_or(LibraryServiceError::MissingField("status"))?
        .parse()?;
    let return_date = parse_timestamp("returnDate", body.return_date)?;
    let usecase = UpdateBorrowStatusUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id, status, return_date).await?))
}
