//! Study notes and digitised rare books. Both are published PDFs that admins
//! can hide without deleting.

use tracing::info;

use gcmn_domain::status::PublishStatus;

use crate::domain::repository::{NoteRepository, RareBookRepository};
use crate::domain::types::{NewNote, NewRareBook, Note, NotePatch, RareBook, require};
use crate::error::LibraryServiceError;

/// Category given to a rare book submitted without one.
pub const DEFAULT_RARE_BOOK_CATEGORY: &str = "General";

// ── Notes ────────────────────────────────────────────────────────────────────

pub struct ListNotesUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> ListNotesUseCase<R> {
    /// Published notes only, unless `include_inactive`.
    pub async fn execute(&self, include_inactive: bool) -> Result<Vec<Note>, LibraryServiceError> {
        if include_inactive {
            self.repo.list_notes().await
        } else {
            self.repo.list_active_notes().await
        }
    }
}

pub struct FilterNotesUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> FilterNotesUseCase<R> {
    pub async fn execute(
        &self,
        class_name: Option<String>,
        subject: Option<String>,
    ) -> Result<Vec<Note>, LibraryServiceError> {
        let class_name = require(class_name, "class")?;
        let subject = require(subject, "subject")?;
        self.repo
            .list_notes_by_class_and_subject(&class_name, &subject)
            .await
    }
}

#[derive(Debug, Default)]
pub struct CreateNoteInput {
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<PublishStatus>,
}

pub struct CreateNoteUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> CreateNoteUseCase<R> {
    pub async fn execute(&self, input: CreateNoteInput) -> Result<Note, LibraryServiceError> {
        let note = self
            .repo
            .create_note(NewNote {
                class_name: require(input.class_name, "class")?,
                subject: require(input.subject, "subject")?,
                title: require(input.title, "title")?,
                description: require(input.description, "description")?,
                pdf_path: require(input.pdf_path, "pdfPath")?,
                status: input.status.unwrap_or_default(),
            })
            .await?;
        info!(note_id = %note.id, class = %note.class_name, subject = %note.subject, "note published");
        Ok(note)
    }
}

pub struct UpdateNoteUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> UpdateNoteUseCase<R> {
    pub async fn execute(&self, id: &str, patch: NotePatch) -> Result<Note, LibraryServiceError> {
        self.repo
            .update_note(id, patch)
            .await?
            .ok_or(LibraryServiceError::NoteNotFound)
    }
}

pub struct ToggleNoteUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> ToggleNoteUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<Note, LibraryServiceError> {
        let note = self
            .repo
            .toggle_note_status(id)
            .await?
            .ok_or(LibraryServiceError::NoteNotFound)?;
        info!(note_id = %id, status = %note.status, "note visibility toggled");
        Ok(note)
    }
}

pub struct DeleteNoteUseCase<R: NoteRepository> {
    pub repo: R,
}

impl<R: NoteRepository> DeleteNoteUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.repo.delete_note(id).await
    }
}

// ── Rare books ───────────────────────────────────────────────────────────────

pub struct ListRareBooksUseCase<R: RareBookRepository> {
    pub repo: R,
}

impl<R: RareBookRepository> ListRareBooksUseCase<R> {
    pub async fn execute(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<RareBook>, LibraryServiceError> {
        if include_inactive {
            self.repo.list_rare_books().await
        } else {
            self.repo.list_active_rare_books().await
        }
    }
}

#[derive(Debug, Default)]
pub struct CreateRareBookInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<PublishStatus>,
}

pub struct CreateRareBookUseCase<R: RareBookRepository> {
    pub repo: R,
}

impl<R: RareBookRepository> CreateRareBookUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateRareBookInput,
    ) -> Result<RareBook, LibraryServiceError> {
        let book = self
            .repo
            .create_rare_book(NewRareBook {
                title: require(input.title, "title")?,
                description: require(input.description, "description")?,
                category: input
                    .category
                    .map(|c| c.trim().to_owned())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_RARE_BOOK_CATEGORY.to_owned()),
                pdf_path: require(input.pdf_path, "pdfPath")?,
                status: input.status.unwrap_or_default(),
            })
            .await?;
        info!(rare_book_id = %book.id, category = %book.category, "rare book published");
        Ok(book)
    }
}

pub struct ToggleRareBookUseCase<R: RareBookRepository> {
    pub repo: R,
}

impl<R: RareBookRepository> ToggleRareBookUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<RareBook, LibraryServiceError> {
        let book = self
            .repo
            .toggle_rare_book_status(id)
            .await?
            .ok_or(LibraryServiceError::RareBookNotFound)?;
        info!(rare_book_id = %id, status = %book.status, "rare book visibility toggled");
        Ok(book)
    }
}

pub struct DeleteRareBookUseCase<R: RareBookRepository> {
    pub repo: R,
}

impl<R: RareBookRepository> DeleteRareBookUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.repo.delete_rare_book(id).await
    }
}
