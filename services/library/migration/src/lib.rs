pub use sea_orm_migration::MigratorTrait;
use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_profiles;
mod m20250601_000003_create_user_roles;
mod m20250601_000004_create_contact_messages;
mod m20250601_000005_create_book_borrows;
mod m20250601_000006_create_library_card_applications;
mod m20250601_000007_create_donations;
mod m20250601_000008_create_notes;
mod m20250601_000009_create_rare_books;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_profiles::Migration),
            Box::new(m20250601_000003_create_user_roles::Migration),
            Box::new(m20250601_000004_create_contact_messages::Migration),
            Box::new(m20250601_000005_create_book_borrows::Migration),
            Box::new(m20250601_000006_create_library_card_applications::Migration),
            Box::new(m20250601_000007_create_donations::Migration),
            Box::new(m20250601_000008_create_notes::Migration),
            Box::new(m20250601_000009_create_rare_books::Migration),
        ]
    }
}
