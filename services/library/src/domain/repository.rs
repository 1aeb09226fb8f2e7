//! Storage ports.
//!
//! Both backends implement every trait here with identical semantics:
//! `create` assigns the id and creation timestamp and returns the stored record,
//! updates on a missing id return `None`, deletes of a missing id succeed, and a
//! write is durable before its future resolves.
//!
//! Methods return `impl Future + Send` so handlers generic over [`Storage`]
//! stay `Send`.

use std::future::Future;

use chrono::{DateTime, Utc};

use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, BorrowStatus, UserKind};

use crate::domain::types::{
    BookBorrow, CardApplication, ContactMessage, Donation, NewBookBorrow, NewCardApplication,
    NewContactMessage, NewDonation, NewNote, NewRareBook, NewUser, Note, NotePatch, Profile,
    ProfilePatch, RareBook, User, UserRole,
};
use crate::error::LibraryServiceError;

type Res<T> = Result<T, LibraryServiceError>;

/// Registered accounts. Email lookup is case-sensitive.
pub trait UserRepository: Send + Sync {
    fn find_user(&self, id: &str) -> impl Future<Output = Res<Option<User>>> + Send;
    fn find_user_by_email(&self, email: &str) -> impl Future<Output = Res<Option<User>>> + Send;
    /// Fails with `EmailAlreadyRegistered` when the email is taken.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Res<User>> + Send;
    fn list_users(&self) -> impl Future<Output = Res<Vec<User>>> + Send;
    fn list_users_by_kind(&self, kind: UserKind) -> impl Future<Output = Res<Vec<User>>> + Send;
}

pub trait ProfileRepository: Send + Sync {
    fn find_profile(&self, user_id: &str) -> impl Future<Output = Res<Option<Profile>>> + Send;
    /// Merge `patch` into the user's profile, creating it on first write.
    /// An existing profile gets `updated_at` stamped.
    fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> impl Future<Output = Res<Profile>> + Send;
}

/// Role membership is a set of `(user_id, role)` pairs.
pub trait UserRoleRepository: Send + Sync {
    fn list_roles(&self, user_id: &str) -> impl Future<Output = Res<Vec<UserRole>>> + Send;
    /// Granting a role the user already holds returns the existing grant.
    fn grant_role(&self, user_id: &str, role: AppRole)
    -> impl Future<Output = Res<UserRole>> + Send;
    fn has_role(&self, user_id: &str, role: AppRole) -> impl Future<Output = Res<bool>> + Send;
}

pub trait ContactMessageRepository: Send + Sync {
    fn list_messages(&self) -> impl Future<Output = Res<Vec<ContactMessage>>> + Send;
    fn find_message(&self, id: &str) -> impl Future<Output = Res<Option<ContactMessage>>> + Send;
    /// New messages start unseen.
    fn create_message(
        &self,
        message: NewContactMessage,
    ) -> impl Future<Output = Res<ContactMessage>> + Send;
    fn set_message_seen(
        &self,
        id: &str,
        seen: bool,
    ) -> impl Future<Output = Res<Option<ContactMessage>>> + Send;
    fn delete_message(&self, id: &str) -> impl Future<Output = Res<()>> + Send;
}

pub trait BookBorrowRepository: Send + Sync {
    fn list_borrows(&self) -> impl Future<Output = Res<Vec<BookBorrow>>> + Send;
    fn find_borrow(&self, id: &str) -> impl Future<Output = Res<Option<BookBorrow>>> + Send;
    fn list_borrows_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Res<Vec<BookBorrow>>> + Send;
    /// New loans start as `borrowed`.
    fn create_borrow(&self, borrow: NewBookBorrow) -> impl Future<Output = Res<BookBorrow>> + Send;
    /// Set the status; `return_date` is written only when given.
    fn update_borrow_status(
        &self,
        id: &str,
        status: BorrowStatus,
        return_date: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Res<Option<BookBorrow>>> + Send;
}

/// Library card applications.
///
/// Both unique constraints are enforced at insert: a second application with
/// the same email (ignoring case) fails with `DuplicateApplication`, a second
/// card number with `CardNumberTaken`.
pub trait CardApplicationRepository: Send + Sync {
    fn list_applications(&self) -> impl Future<Output = Res<Vec<CardApplication>>> + Send;
    fn find_application(
        &self,
        id: &str,
    ) -> impl Future<Output = Res<Option<CardApplication>>> + Send;
    fn list_applications_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Res<Vec<CardApplication>>> + Send;
    fn find_application_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Res<Option<CardApplication>>> + Send;
    fn find_application_by_card_number(
        &self,
        card_number: &str,
    ) -> impl Future<Output = Res<Option<CardApplication>>> + Send;
    fn create_application(
        &self,
        application: NewCardApplication,
    ) -> impl Future<Output = Res<CardApplication>> + Send;
    fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> impl Future<Output = Res<Option<CardApplication>>> + Send;
    fn delete_application(&self, id: &str) -> impl Future<Output = Res<()>> + Send;
}

pub trait DonationRepository: Send + Sync {
    fn list_donations(&self) -> impl Future<Output = Res<Vec<Donation>>> + Send;
    fn find_donation(&self, id: &str) -> impl Future<Output = Res<Option<Donation>>> + Send;
    fn create_donation(&self, donation: NewDonation) -> impl Future<Output = Res<Donation>> + Send;
    fn delete_donation(&self, id: &str) -> impl Future<Output = Res<()>> + Send;
}

pub trait NoteRepository: Send + Sync {
    fn list_notes(&self) -> impl Future<Output = Res<Vec<Note>>> + Send;
    fn list_active_notes(&self) -> impl Future<Output = Res<Vec<Note>>> + Send;
    /// Active notes whose class and subject match exactly.
    fn list_notes_by_class_and_subject(
        &self,
        class_name: &str,
        subject: &str,
    ) -> impl Future<Output = Res<Vec<Note>>> + Send;
    fn find_note(&self, id: &str) -> impl Future<Output = Res<Option<Note>>> + Send;
    fn create_note(&self, note: NewNote) -> impl Future<Output = Res<Note>> + Send;
    fn update_note(
        &self,
        id: &str,
        patch: NotePatch,
    ) -> impl Future<Output = Res<Option<Note>>> + Send;
    fn toggle_note_status(&self, id: &str) -> impl Future<Output = Res<Option<Note>>> + Send;
    fn delete_note(&self, id: &str) -> impl Future<Output = Res<()>> + Send;
}

pub trait RareBookRepository: Send + Sync {
    fn list_rare_books(&self) -> impl Future<Output = Res<Vec<RareBook>>> + Send;
    fn list_active_rare_books(&self) -> impl Future<Output = Res<Vec<RareBook>>> + Send;
    fn find_rare_book(&self, id: &str) -> impl Future<Output = Res<Option<RareBook>>> + Send;
    fn create_rare_book(&self, book: NewRareBook) -> impl Future<Output = Res<RareBook>> + Send;
    fn toggle_rare_book_status(
        &self,
        id: &str,
    ) -> impl Future<Output = Res<Option<RareBook>>> + Send;
    fn delete_rare_book(&self, id: &str) -> impl Future<Output = Res<()>> + Send;
}

/// Liveness of the backing medium, used by `/readyz`.
pub trait HealthCheck: Send + Sync {
    fn ping(&self) -> impl Future<Output = Res<()>> + Send;
}

/// A complete storage backend.
pub trait Storage:
    UserRepository
    + ProfileRepository
    + UserRoleRepository
    + ContactMessageRepository
    + BookBorrowRepository
    + CardApplicationRepository
    + DonationRepository
    + NoteRepository
    + RareBookRepository
    + HealthCheck
    + Clone
    + 'static
{
}

impl<T> Storage for T where
    T: UserRepository
        + ProfileRepository
        + UserRoleRepository
        + ContactMessageRepository
        + BookBorrowRepository
        + CardApplicationRepository
        + DonationRepository
        + NoteRepository
        + RareBookRepository
        + HealthCheck
        + Clone
        + 'static
{
}
