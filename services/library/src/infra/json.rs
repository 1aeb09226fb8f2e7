//! Document-file storage backend.
//!
//! The whole dataset is one JSON document with a top-level array per
//! collection. Every mutation is applied to a copy, the copy is written to a
//! sibling temp file, fsynced and renamed over the data file, and only then
//! replaces the in-memory state. A write that fails leaves both untouched.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt as _;
use tokio::sync::RwLock;

use gcmn_domain::id::new_record_id;
use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, BorrowStatus, PublishStatus, UserKind};

use crate::domain::repository::{
    BookBorrowRepository, CardApplicationRepository, ContactMessageRepository,
    DonationRepository, HealthCheck, NoteRepository, ProfileRepository, RareBookRepository,
    UserRepository, UserRoleRepository,
};
use crate::domain::types::{
    BookBorrow, CardApplication, ContactMessage, Donation, NewBookBorrow, NewCardApplication,
    NewContactMessage, NewDonation, NewNote, NewRareBook, NewUser, Note, NotePatch, Profile,
    ProfilePatch, RareBook, User, UserRole, now,
};
use crate::error::LibraryServiceError;

/// On-disk document. Collections missing from an older file default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
    pub contact_messages: Vec<ContactMessage>,
    pub book_borrows: Vec<BookBorrow>,
    pub library_card_applications: Vec<CardApplication>,
    pub donations: Vec<Donation>,
    pub user_roles: Vec<UserRole>,
    pub notes: Vec<Note>,
    pub rare_books: Vec<RareBook>,
}

#[derive(Clone)]
pub struct JsonStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    data: RwLock<Dataset>,
}

impl JsonStore {
    /// Load the data file, creating an empty one if it does not exist.
    ///
    /// A file that exists but does not parse is an error; it is never
    /// overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse data file {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("create data dir {}", parent.display()))?;
                }
                let empty = Dataset::default();
                persist(&path, &empty).await?;
                tracing::info!(path = %path.display(), "created empty data file");
                empty
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read data file {}", path.display()));
            }
        };
        Ok(Self {
            inner: Arc::new(Inner {
                path,
                data: RwLock::new(data),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    async fn read<T>(&self, f: impl FnOnce(&Dataset) -> T + Send) -> T {
        let data = self.inner.data.read().await;
        f(&data)
    }

    /// Apply `f` to a copy of the dataset and commit it if `f` succeeds.
    ///
    /// Writers are serialized by the lock, so checks made inside `f` hold
    /// until the commit.
    async fn mutate<T: Send>(
        &self,
        f: impl FnOnce(&mut Dataset) -> Result<T, LibraryServiceError> + Send,
    ) -> Result<T, LibraryServiceError> {
        let mut data = self.inner.data.write().await;
        let mut next = data.clone();
        let out = f(&mut next)?;
        if next != *data {
            if let Err(e) = persist(&self.inner.path, &next).await {
                tracing::error!(error = %e, path = %self.inner.path.display(), "failed to write data file");
                return Err(e.into());
            }
            *data = next;
        }
        Ok(out)
    }
}

async fn persist(path: &Path, data: &Dataset) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(data).context("serialize dataset")?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .with_context(|| format!("create {}", tmp.display()))?;
    file.write_all(&bytes).await.context("write data file")?;
    file.sync_all().await.context("sync data file")?;
    drop(file);
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename {} over {}", tmp.display(), path.display()))?;
    Ok(())
}

fn find_cloned<T: Clone>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<T> {
    items.iter().find(|item| pred(item)).cloned()
}

fn filter_cloned<T: Clone>(items: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| pred(item)).cloned().collect()
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for JsonStore {
    async fn find_user(&self, id: &str) -> Result<Option<User>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.users, |u| u.id == id)).await)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.users, |u| u.email == email)).await)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, LibraryServiceError> {
        self.mutate(move |d| {
            if d.users.iter().any(|u| u.email == user.email) {
                return Err(LibraryServiceError::EmailAlreadyRegistered);
            }
            let user = User {
                id: new_record_id(),
                email: user.email,
                password_hash: user.password_hash,
                full_name: user.full_name,
                phone: user.phone,
                roll_number: user.roll_number,
                department: user.department,
                student_class: user.student_class,
                kind: user.kind,
                created_at: now(),
            };
            d.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>, LibraryServiceError> {
        Ok(self.read(|d| d.users.clone()).await)
    }

    async fn list_users_by_kind(&self, kind: UserKind) -> Result<Vec<User>, LibraryServiceError> {
        Ok(self.read(|d| filter_cloned(&d.users, |u| u.kind == kind)).await)
    }
}

// ── Profiles ─────────────────────────────────────────────────────────────────

impl ProfileRepository for JsonStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, LibraryServiceError> {
        Ok(self
            .read(|d| find_cloned(&d.profiles, |p| p.user_id == user_id))
            .await)
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Profile, LibraryServiceError> {
        self.mutate(move |d| {
            if let Some(profile) = d.profiles.iter_mut().find(|p| p.user_id == user_id) {
                patch.apply(profile);
                profile.updated_at = Some(now());
                return Ok(profile.clone());
            }
            let mut profile = Profile {
                id: new_record_id(),
                user_id: user_id.to_owned(),
                full_name: String::new(),
                phone: None,
                roll_number: None,
                department: None,
                student_class: None,
                created_at: now(),
                updated_at: None,
            };
            patch.apply(&mut profile);
            d.profiles.push(profile.clone());
            Ok(profile)
        })
        .await
    }
}

// ── Roles ────────────────────────────────────────────────────────────────────

impl UserRoleRepository for JsonStore {
    async fn list_roles(&self, user_id: &str) -> Result<Vec<UserRole>, LibraryServiceError> {
        Ok(self
            .read(|d| filter_cloned(&d.user_roles, |r| r.user_id == user_id))
            .await)
    }

    async fn grant_role(
        &self,
        user_id: &str,
        role: AppRole,
    ) -> Result<UserRole, LibraryServiceError> {
        self.mutate(move |d| {
            if let Some(existing) =
                find_cloned(&d.user_roles, |r| r.user_id == user_id && r.role == role)
            {
                return Ok(existing);
            }
            let grant = UserRole {
                id: new_record_id(),
                user_id: user_id.to_owned(),
                role,
                created_at: now(),
            };
            d.user_roles.push(grant.clone());
            Ok(grant)
        })
        .await
    }

    async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool, LibraryServiceError> {
        Ok(self
            .read(|d| {
                d.user_roles
                    .iter()
                    .any(|r| r.user_id == user_id && r.role == role)
            })
            .await)
    }
}

// ── Contact messages ─────────────────────────────────────────────────────────

impl ContactMessageRepository for JsonStore {
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, LibraryServiceError> {
        Ok(self.read(|d| d.contact_messages.clone()).await)
    }

    async fn find_message(&self, id: &str) -> Result<Option<ContactMessage>, LibraryServiceError> {
        Ok(self
            .read(|d| find_cloned(&d.contact_messages, |m| m.id == id))
            .await)
    }

    async fn create_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, LibraryServiceError> {
        self.mutate(move |d| {
            let message = ContactMessage {
                id: new_record_id(),
                name: message.name,
                email: message.email,
                subject: message.subject,
                message: message.message,
                is_seen: false,
                created_at: now(),
                updated_at: None,
            };
            d.contact_messages.push(message.clone());
            Ok(message)
        })
        .await
    }

    async fn set_message_seen(
        &self,
        id: &str,
        seen: bool,
    ) -> Result<Option<ContactMessage>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d.contact_messages.iter_mut().find(|m| m.id == id).map(|m| {
                m.is_seen = seen;
                m.updated_at = Some(now());
                m.clone()
            }))
        })
        .await
    }

    async fn delete_message(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.mutate(move |d| {
            d.contact_messages.retain(|m| m.id != id);
            Ok(())
        })
        .await
    }
}

// ── Book borrows ─────────────────────────────────────────────────────────────

impl BookBorrowRepository for JsonStore {
    async fn list_borrows(&self) -> Result<Vec<BookBorrow>, LibraryServiceError> {
        Ok(self.read(|d| d.book_borrows.clone()).await)
    }

    async fn find_borrow(&self, id: &str) -> Result<Option<BookBorrow>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.book_borrows, |b| b.id == id)).await)
    }

    async fn list_borrows_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookBorrow>, LibraryServiceError> {
        Ok(self
            .read(|d| filter_cloned(&d.book_borrows, |b| b.user_id == user_id))
            .await)
    }

    async fn create_borrow(&self, borrow: NewBookBorrow) -> Result<BookBorrow, LibraryServiceError> {
        self.mutate(move |d| {
            let borrow = BookBorrow {
                id: new_record_id(),
                user_id: borrow.user_id,
                book_title: borrow.book_title,
                isbn: borrow.isbn,
                borrow_date: borrow.borrow_date,
                due_date: borrow.due_date,
                return_date: None,
                status: BorrowStatus::Borrowed,
                created_at: now(),
                updated_at: None,
            };
            d.book_borrows.push(borrow.clone());
            Ok(borrow)
        })
        .await
    }

    async fn update_borrow_status(
        &self,
        id: &str,
        status: BorrowStatus,
        return_date: Option<DateTime<Utc>>,
    ) -> Result<Option<BookBorrow>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d.book_borrows.iter_mut().find(|b| b.id == id).map(|b| {
                b.status = status;
                if return_date.is_some() {
                    b.return_date = return_date;
                }
                b.updated_at = Some(now());
                b.clone()
            }))
        })
        .await
    }
}

// ── Card applications ────────────────────────────────────────────────────────

impl CardApplicationRepository for JsonStore {
    async fn list_applications(&self) -> Result<Vec<CardApplication>, LibraryServiceError> {
        Ok(self.read(|d| d.library_card_applications.clone()).await)
    }

    async fn find_application(
        &self,
        id: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        Ok(self
            .read(|d| find_cloned(&d.library_card_applications, |a| a.id == id))
            .await)
    }

    async fn list_applications_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CardApplication>, LibraryServiceError> {
        Ok(self
            .read(|d| {
                filter_cloned(&d.library_card_applications, |a| {
                    a.user_id.as_deref() == Some(user_id)
                })
            })
            .await)
    }

    async fn find_application_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        let email = email.to_lowercase();
        Ok(self
            .read(|d| {
                find_cloned(&d.library_card_applications, |a| {
                    a.email.to_lowercase() == email
                })
            })
            .await)
    }

    async fn find_application_by_card_number(
        &self,
        card_number: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        Ok(self
            .read(|d| {
                find_cloned(&d.library_card_applications, |a| {
                    a.card_number == card_number
                })
            })
            .await)
    }

    async fn create_application(
        &self,
        application: NewCardApplication,
    ) -> Result<CardApplication, LibraryServiceError> {
        self.mutate(move |d| {
            let email = application.email.to_lowercase();
            let apps = &d.library_card_applications;
            if apps.iter().any(|a| a.email.to_lowercase() == email) {
                return Err(LibraryServiceError::DuplicateApplication);
            }
            if apps.iter().any(|a| a.card_number == application.card_number) {
                return Err(LibraryServiceError::CardNumberTaken);
            }
            let stored = CardApplication {
                id: new_record_id(),
                user_id: application.user_id,
                first_name: application.first_name,
                last_name: application.last_name,
                father_name: application.father_name,
                dob: application.dob,
                class_name: application.class_name,
                field: application.field,
                roll_no: application.roll_no,
                email: application.email,
                phone: application.phone,
                address_street: application.address_street,
                address_city: application.address_city,
                address_state: application.address_state,
                address_zip: application.address_zip,
                status: application.status,
                card_number: application.card_number,
                student_id: application.student_id,
                issue_date: application.issue_date,
                valid_through: application.valid_through,
                created_at: now(),
                updated_at: None,
            };
            d.library_card_applications.push(stored.clone());
            Ok(stored)
        })
        .await
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d
                .library_card_applications
                .iter_mut()
                .find(|a| a.id == id)
                .map(|a| {
                    a.status = status;
                    a.updated_at = Some(now());
                    a.clone()
                }))
        })
        .await
    }

    async fn delete_application(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.mutate(move |d| {
            d.library_card_applications.retain(|a| a.id != id);
            Ok(())
        })
        .await
    }
}

// ── Donations ────────────────────────────────────────────────────────────────

impl DonationRepository for JsonStore {
    async fn list_donations(&self) -> Result<Vec<Donation>, LibraryServiceError> {
        Ok(self.read(|d| d.donations.clone()).await)
    }

    async fn find_donation(&self, id: &str) -> Result<Option<Donation>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.donations, |x| x.id == id)).await)
    }

    async fn create_donation(&self, donation: NewDonation) -> Result<Donation, LibraryServiceError> {
        self.mutate(move |d| {
            let donation = Donation {
                id: new_record_id(),
                donor_name: donation.donor_name,
                email: donation.email,
                book_title: donation.book_title,
                author: donation.author,
                quantity: donation.quantity,
                created_at: now(),
            };
            d.donations.push(donation.clone());
            Ok(donation)
        })
        .await
    }

    async fn delete_donation(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.mutate(move |d| {
            d.donations.retain(|x| x.id != id);
            Ok(())
        })
        .await
    }
}

// ── Notes ────────────────────────────────────────────────────────────────────

impl NoteRepository for JsonStore {
    async fn list_notes(&self) -> Result<Vec<Note>, LibraryServiceError> {
        Ok(self.read(|d| d.notes.clone()).await)
    }

    async fn list_active_notes(&self) -> Result<Vec<Note>, LibraryServiceError> {
        Ok(self
            .read(|d| filter_cloned(&d.notes, |n| n.status == PublishStatus::Active))
            .await)
    }

    async fn list_notes_by_class_and_subject(
        &self,
        class_name: &str,
        subject: &str,
    ) -> Result<Vec<Note>, LibraryServiceError> {
        Ok(self
            .read(|d| {
                filter_cloned(&d.notes, |n| {
                    n.class_name == class_name
                        && n.subject == subject
                        && n.status == PublishStatus::Active
                })
            })
            .await)
    }

    async fn find_note(&self, id: &str) -> Result<Option<Note>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.notes, |n| n.id == id)).await)
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, LibraryServiceError> {
        self.mutate(move |d| {
            let note = Note {
                id: new_record_id(),
                class_name: note.class_name,
                subject: note.subject,
                title: note.title,
                description: note.description,
                pdf_path: note.pdf_path,
                status: note.status,
                created_at: now(),
                updated_at: None,
            };
            d.notes.push(note.clone());
            Ok(note)
        })
        .await
    }

    async fn update_note(
        &self,
        id: &str,
        patch: NotePatch,
    ) -> Result<Option<Note>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d.notes.iter_mut().find(|n| n.id == id).map(|n| {
                patch.apply(n);
                n.updated_at = Some(now());
                n.clone()
            }))
        })
        .await
    }

    async fn toggle_note_status(&self, id: &str) -> Result<Option<Note>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d.notes.iter_mut().find(|n| n.id == id).map(|n| {
                n.status = n.status.toggled();
                n.updated_at = Some(now());
                n.clone()
            }))
        })
        .await
    }

    async fn delete_note(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.mutate(move |d| {
            d.notes.retain(|n| n.id != id);
            Ok(())
        })
        .await
    }
}

// ── Rare books ───────────────────────────────────────────────────────────────

impl RareBookRepository for JsonStore {
    async fn list_rare_books(&self) -> Result<Vec<RareBook>, LibraryServiceError> {
        Ok(self.read(|d| d.rare_books.clone()).await)
    }

    async fn list_active_rare_books(&self) -> Result<Vec<RareBook>, LibraryServiceError> {
        Ok(self
            .read(|d| filter_cloned(&d.rare_books, |b| b.status == PublishStatus::Active))
            .await)
    }

    async fn find_rare_book(&self, id: &str) -> Result<Option<RareBook>, LibraryServiceError> {
        Ok(self.read(|d| find_cloned(&d.rare_books, |b| b.id == id)).await)
    }

    async fn create_rare_book(&self, book: NewRareBook) -> Result<RareBook, LibraryServiceError> {
        self.mutate(move |d| {
            let book = RareBook {
                id: new_record_id(),
                title: book.title,
                description: book.description,
                category: book.category,
                pdf_path: book.pdf_path,
                status: book.status,
                created_at: now(),
                updated_at: None,
            };
            d.rare_books.push(book.clone());
            Ok(book)
        })
        .await
    }

    async fn toggle_rare_book_status(
        &self,
        id: &str,
    ) -> Result<Option<RareBook>, LibraryServiceError> {
        self.mutate(move |d| {
            Ok(d.rare_books.iter_mut().find(|b| b.id == id).map(|b| {
                b.status = b.status.toggled();
                b.updated_at = Some(now());
                b.clone()
            }))
        })
        .await
    }

    async fn delete_rare_book(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.mutate(move |d| {
            d.rare_books.retain(|b| b.id != id);
            Ok(())
        })
        .await
    }
}

impl HealthCheck for JsonStore {
    async fn ping(&self) -> Result<(), LibraryServiceError> {
        tokio::fs::metadata(&self.inner.path)
            .await
            .with_context(|| format!("stat data file {}", self.inner.path.display()))?;
        Ok(())
    }
}
