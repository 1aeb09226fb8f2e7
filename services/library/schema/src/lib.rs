//! sea-orm entities for the relational storage backend.
//!
//! Status and role columns hold the lowercase wire strings; parsing into the
//! domain enums happens in the service.

pub mod book_borrows;
pub mod contact_messages;
pub mod donations;
pub mod library_card_applications;
pub mod notes;
pub mod profiles;
pub mod rare_books;
pub mod user_roles;
pub mod users;
