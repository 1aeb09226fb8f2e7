use gcmn_domain::status::{BorrowStatus, UserKind};

use crate::domain::repository::{
    BookBorrowRepository, CardApplicationRepository, DonationRepository, UserRepository,
};
use crate::domain::types::User;
use crate::error::LibraryServiceError;

// ── Directory ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UserDirectory {
    pub students: Vec<User>,
    pub non_students: Vec<User>,
}

pub struct DirectoryUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DirectoryUseCase<R> {
    pub async fn execute(&self) -> Result<UserDirectory, LibraryServiceError> {
        Ok(UserDirectory {
            students: self.repo.list_users_by_kind(UserKind::Student).await?,
            non_students: self.repo.list_users_by_kind(UserKind::User).await?,
        })
    }
}

// ── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub total_users: usize,
    pub total_borrows: usize,
    pub library_cards: usize,
    pub borrowed_books: usize,
    pub returned_books: usize,
    pub donations: usize,
}

pub struct StatsUseCase<R> {
    pub repo: R,
}

impl<R> StatsUseCase<R>
where
    R: UserRepository + BookBorrowRepository + CardApplicationRepository + DonationRepository,
{
    pub async fn execute(&self) -> Result<LibraryStats, LibraryServiceError> {
        let borrows = self.repo.list_borrows().await?;
        let borrowed_books = borrows
            .iter()
            .filter(|b| b.status == BorrowStatus::Borrowed)
            .count();
        Ok(LibraryStats {
            total_users: self.repo.list_users().await?.len(),
            total_borrows: borrows.len(),
            library_cards: self.repo.list_applications().await?.len(),
            borrowed_books,
            returned_books: borrows.len() - borrowed_books,
            donations: self.repo.list_donations().await?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcmn_testing::fixture::DataDir;

    use crate::domain::types::{NewBookBorrow, NewDonation, NewUser, now};
    use crate::infra::json::JsonStore;

    fn user(email: &str, kind: UserKind) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            full_name: "Someone".into(),
            phone: None,
            roll_number: None,
            department: None,
            student_class: None,
            kind,
        }
    }

    fn borrow(user_id: &str) -> NewBookBorrow {
        NewBookBorrow {
            user_id: user_id.into(),
            book_title: "Sapiens".into(),
            isbn: "978-0062316097".into(),
            borrow_date: now(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn should_split_users_by_kind() {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        store
            .create_user(user("s@example.com", UserKind::Student))
            .await
            .unwrap();
        store
            .create_user(user("u@example.com", UserKind::User))
            .await
            .unwrap();
        store
            .create_user(user("t@example.com", UserKind::Student))
            .await
            .unwrap();

        let directory = DirectoryUseCase { repo: store }.execute().await.unwrap();
        assert_eq!(directory.students.len(), 2);
        assert_eq!(directory.non_students.len(), 1);
    }

    #[tokio::test]
    async fn should_count_collections() {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        store
            .create_user(user("s@example.com", UserKind::Student))
            .await
            .unwrap();
        let first = store.create_borrow(borrow("u-1")).await.unwrap();
        store.create_borrow(borrow("u-1")).await.unwrap();
        store.create_borrow(borrow("u-2")).await.unwrap();
        store
            .update_borrow_status(&first.id, BorrowStatus::Returned, Some(now()))
            .await
            .unwrap();
        store
            .create_donation(NewDonation {
                donor_name: "Anon".into(),
                email: None,
                book_title: "Sapiens".into(),
                author: None,
                quantity: 2,
            })
            .await
            .unwrap();

        let stats = StatsUseCase { repo: store }.execute().await.unwrap();
        assert_eq!(
            stats,
            LibraryStats {
                total_users: 1,
                total_borrows: 3,
                library_cards: 0,
                borrowed_books: 2,
                returned_books: 1,
                donations: 1,
            }
        );
    }
}
