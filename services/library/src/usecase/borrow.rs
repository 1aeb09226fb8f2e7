use chrono::{DateTime, Utc};
use tracing::info;

use gcmn_domain::status::BorrowStatus;

use crate::domain::repository::BookBorrowRepository;
use crate::domain::types::{BookBorrow, NewBookBorrow, now, require};
use crate::error::LibraryServiceError;

// ── ListBorrows ──────────────────────────────────────────────────────────────

pub struct ListBorrowsUseCase<R: BookBorrowRepository> {
    pub repo: R,
}

impl<R: BookBorrowRepository> ListBorrowsUseCase<R> {
    /// Every loan, or only the loans of `borrower`.
    pub async fn execute(
        &self,
        borrower: Option<&str>,
    ) -> Result<Vec<BookBorrow>, LibraryServiceError> {
        match borrower {
            Some(user_id) => self.repo.list_borrows_by_user(user_id).await,
            None => self.repo.list_borrows().await,
        }
    }
}

// ── BorrowBook ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BorrowBookInput {
    pub book_title: Option<String>,
    pub isbn: Option<String>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

pub struct BorrowBookUseCase<R: BookBorrowRepository> {
    pub repo: R,
}

impl<R: BookBorrowRepository> BorrowBookUseCase<R> {
    pub async fn execute(
        &self,
        user_id: &str,
        input: BorrowBookInput,
    ) -> Result<BookBorrow, LibraryServiceError> {
        let borrow = self
            .repo
            .create_borrow(NewBookBorrow {
                user_id: user_id.to_owned(),
                book_title: require(input.book_title, "bookTitle")?,
                isbn: require(input.isbn, "isbn")?,
                borrow_date: input.borrow_date.unwrap_or_else(now),
                due_date: input.due_date,
            })
            .await?;
        info!(borrow_id = %borrow.id, %user_id, isbn = %borrow.isbn, "book borrowed");
        Ok(borrow)
    }
}

// ── UpdateBorrowStatus ───────────────────────────────────────────────────────

pub struct UpdateBorrowStatusUseCase<R: BookBorrowRepository> {
    pub repo: R,
}

impl<R: BookBorrowRepository> UpdateBorrowStatusUseCase<R> {
    /// Move a loan forward. Marking it returned stamps `return_date`, now
    /// unless given; a returned loan cannot be borrowed again.
    pub async fn execute(
        &self,
        id: &str,
        status: BorrowStatus,
        return_date: Option<DateTime<Utc>>,
    ) -> Result<BookBorrow, LibraryServiceError> {
        let current = self
            .repo
            .find_borrow(id)
            .await?
            .ok_or(LibraryServiceError::BorrowNotFound)?;
        if !current.status.can_become(status) {
            return Err(LibraryServiceError::AlreadyReturned);
        }
        let return_date = match status {
            BorrowStatus::Returned => Some(return_date.unwrap_or_else(now)),
            BorrowStatus::Borrowed => None,
        };
        let updated = self
            .repo
            .update_borrow_status(id, status, return_date)
            .await?
            .ok_or(LibraryServiceError::BorrowNotFound)?;
        info!(borrow_id = %id, %status, "borrow status changed");
        Ok(updated)
    }
}
