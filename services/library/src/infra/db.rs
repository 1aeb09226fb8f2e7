use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, QueryFilter, QueryOrder, TransactionTrait,
};

use gcmn_core::sea_ext::unique_violation;
use gcmn_domain::id::new_record_id;
use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, BorrowStatus, PublishStatus, UnknownStatus, UserKind};
use gcmn_library_migration::{Migrator, MigratorTrait as _};
use gcmn_library_schema::{
    book_borrows, contact_messages, donations, library_card_applications, notes, profiles,
    rare_books, user_roles, users,
};

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

/// Relational storage backend.
#[derive(Clone)]
pub struct DbStore {
    pub db: DatabaseConnection,
}

impl DbStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let db = Database::connect(url)
            .await
            .context("connect to database")?;
        Migrator::up(&db, None).await.context("run migrations")?;
        Ok(Self { db })
    }
}

/// Statuses read back from storage must be in the vocabulary; anything else is
/// a corrupt row.
fn parse_stored<T>(value: &str) -> Result<T, LibraryServiceError>
where
    T: std::str::FromStr<Err = UnknownStatus>,
{
    value
        .parse()
        .map_err(|e: UnknownStatus| LibraryServiceError::Internal(anyhow::Error::new(e)))
}

/// Result of an update on a row read earlier in the same operation. A row that
/// vanished in between reads as a miss, like one that never existed.
fn updated_or_missing<M>(
    result: Result<M, DbErr>,
    what: &'static str,
) -> Result<Option<M>, LibraryServiceError> {
    match result {
        Ok(model) => Ok(Some(model)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(storage_error(e, what)),
    }
}

fn storage_error(err: DbErr, what: &'static str) -> LibraryServiceError {
    tracing::error!(error = %err, what, "database operation failed");
    LibraryServiceError::Internal(anyhow::Error::new(err).context(what))
}

// ── User repository ──────────────────────────────────────────────────────────

impl UserRepository for DbStore {
    async fn find_user(&self, id: &str) -> Result<Option<User>, LibraryServiceError> {
        let model = users::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find user by id"))?;
        model.map(user_from_model).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, LibraryServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find user by email"))?;
        model.map(user_from_model).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, LibraryServiceError> {
        let model = users::ActiveModel {
            id: Set(new_record_id()),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            full_name: Set(user.full_name),
            phone: Set(user.phone),
            roll_number: Set(user.roll_number),
            department: Set(user.department),
            student_class: Set(user.student_class),
            kind: Set(user.kind.as_str().to_owned()),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => LibraryServiceError::EmailAlreadyRegistered,
            None => storage_error(e, "create user"),
        })?;
        user_from_model(model)
    }

    async fn list_users(&self) -> Result<Vec<User>, LibraryServiceError> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list users"))?
            .into_iter()
            .map(user_from_model)
            .collect()
    }

    async fn list_users_by_kind(&self, kind: UserKind) -> Result<Vec<User>, LibraryServiceError> {
        users::Entity::find()
            .filter(users::Column::Kind.eq(kind.as_str()))
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list users by kind"))?
            .into_iter()
            .map(user_from_model)
            .collect()
    }
}

fn user_from_model(model: users::Model) -> Result<User, LibraryServiceError> {
    Ok(User {
        kind: parse_stored(&model.kind)?,
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        phone: model.phone,
        roll_number: model.roll_number,
        department: model.department,
        student_class: model.student_class,
        created_at: model.created_at,
    })
}

// ── Profile repository ───────────────────────────────────────────────────────

impl ProfileRepository for DbStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, LibraryServiceError> {
        let model = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find profile"))?;
        Ok(model.map(profile_from_model))
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Profile, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin profile upsert"))?;

        let existing = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find profile for upsert"))?;

        let model = match existing {
            Some(model) => {
                let mut profile = profile_from_model(model);
                patch.apply(&mut profile);
                profile.updated_at = Some(now());
                profile_active_model(profile)
                    .update(&txn)
                    .await
                    .map_err(|e| storage_error(e, "update profile"))?
            }
            None => {
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
                profile_active_model(profile)
                    .insert(&txn)
                    .await
                    .map_err(|e| storage_error(e, "create profile"))?
            }
        };

        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit profile upsert"))?;
        Ok(profile_from_model(model))
    }
}

fn profile_active_model(profile: Profile) -> profiles::ActiveModel {
    profiles::ActiveModel {
        id: Set(profile.id),
        user_id: Set(profile.user_id),
        full_name: Set(profile.full_name),
        phone: Set(profile.phone),
        roll_number: Set(profile.roll_number),
        department: Set(profile.department),
        student_class: Set(profile.student_class),
        created_at: Set(profile.created_at),
        updated_at: Set(profile.updated_at),
    }
}

fn profile_from_model(model: profiles::Model) -> Profile {
    Profile {
        id: model.id,
        user_id: model.user_id,
        full_name: model.full_name,
        phone: model.phone,
        roll_number: model.roll_number,
        department: model.department,
        student_class: model.student_class,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Role repository ──────────────────────────────────────────────────────────

impl UserRoleRepository for DbStore {
    async fn list_roles(&self, user_id: &str) -> Result<Vec<UserRole>, LibraryServiceError> {
        user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .order_by_asc(user_roles::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list roles"))?
            .into_iter()
            .map(role_from_model)
            .collect()
    }

    async fn grant_role(
        &self,
        user_id: &str,
        role: AppRole,
    ) -> Result<UserRole, LibraryServiceError> {
        let inserted = user_roles::ActiveModel {
            id: Set(new_record_id()),
            user_id: Set(user_id.to_owned()),
            role: Set(role.as_str().to_owned()),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => role_from_model(model),
            Err(e) if unique_violation(&e).is_some() => {
                let existing = user_roles::Entity::find()
                    .filter(user_roles::Column::UserId.eq(user_id))
                    .filter(user_roles::Column::Role.eq(role.as_str()))
                    .one(&self.db)
                    .await
                    .map_err(|e| storage_error(e, "find existing role"))?
                    .context("role grant vanished after unique violation")?;
                role_from_model(existing)
            }
            Err(e) => Err(storage_error(e, "grant role")),
        }
    }

    async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool, LibraryServiceError> {
        let found = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(user_roles::Column::Role.eq(role.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "check role"))?;
        Ok(found.is_some())
    }
}

fn role_from_model(model: user_roles::Model) -> Result<UserRole, LibraryServiceError> {
    Ok(UserRole {
        role: parse_stored(&model.role)?,
        id: model.id,
        user_id: model.user_id,
        created_at: model.created_at,
    })
}

// ── Contact message repository ───────────────────────────────────────────────

impl ContactMessageRepository for DbStore {
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, LibraryServiceError> {
        let models = contact_messages::Entity::find()
            .order_by_asc(contact_messages::Column::CreatedAt)
            .order_by_asc(contact_messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list contact messages"))?;
        Ok(models.into_iter().map(message_from_model).collect())
    }

    async fn find_message(&self, id: &str) -> Result<Option<ContactMessage>, LibraryServiceError> {
        let model = contact_messages::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find contact message"))?;
        Ok(model.map(message_from_model))
    }

    async fn create_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, LibraryServiceError> {
        let model = contact_messages::ActiveModel {
            id: Set(new_record_id()),
            name: Set(message.name),
            email: Set(message.email),
            subject: Set(message.subject),
            message: Set(message.message),
            is_seen: Set(false),
            created_at: Set(now()),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create contact message"))?;
        Ok(message_from_model(model))
    }

    async fn set_message_seen(
        &self,
        id: &str,
        seen: bool,
    ) -> Result<Option<ContactMessage>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin contact message update"))?;
        let Some(model) = contact_messages::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find contact message"))?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.is_seen = Set(seen);
        am.updated_at = Set(Some(now()));
        let Some(model) =
            updated_or_missing(am.update(&txn).await, "mark contact message seen")?
        else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit contact message update"))?;
        Ok(Some(message_from_model(model)))
    }

    async fn delete_message(&self, id: &str) -> Result<(), LibraryServiceError> {
        contact_messages::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error(e, "delete contact message"))?;
        Ok(())
    }
}

fn message_from_model(model: contact_messages::Model) -> ContactMessage {
    ContactMessage {
        id: model.id,
        name: model.name,
        email: model.email,
        subject: model.subject,
        message: model.message,
        is_seen: model.is_seen,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Book borrow repository ───────────────────────────────────────────────────

impl BookBorrowRepository for DbStore {
    async fn list_borrows(&self) -> Result<Vec<BookBorrow>, LibraryServiceError> {
        book_borrows::Entity::find()
            .order_by_asc(book_borrows::Column::CreatedAt)
            .order_by_asc(book_borrows::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list book borrows"))?
            .into_iter()
            .map(borrow_from_model)
            .collect()
    }

    async fn find_borrow(&self, id: &str) -> Result<Option<BookBorrow>, LibraryServiceError> {
        let model = book_borrows::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find book borrow"))?;
        model.map(borrow_from_model).transpose()
    }

    async fn list_borrows_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookBorrow>, LibraryServiceError> {
        book_borrows::Entity::find()
            .filter(book_borrows::Column::UserId.eq(user_id))
            .order_by_asc(book_borrows::Column::CreatedAt)
            .order_by_asc(book_borrows::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list book borrows by user"))?
            .into_iter()
            .map(borrow_from_model)
            .collect()
    }

    async fn create_borrow(&self, borrow: NewBookBorrow) -> Result<BookBorrow, LibraryServiceError> {
        let model = book_borrows::ActiveModel {
            id: Set(new_record_id()),
            user_id: Set(borrow.user_id),
            book_title: Set(borrow.book_title),
            isbn: Set(borrow.isbn),
            borrow_date: Set(borrow.borrow_date),
            due_date: Set(borrow.due_date),
            return_date: Set(None),
            status: Set(BorrowStatus::Borrowed.as_str().to_owned()),
            created_at: Set(now()),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create book borrow"))?;
        borrow_from_model(model)
    }

    async fn update_borrow_status(
        &self,
        id: &str,
        status: BorrowStatus,
        return_date: Option<DateTime<Utc>>,
    ) -> Result<Option<BookBorrow>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin book borrow update"))?;
        let Some(model) = book_borrows::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find book borrow"))?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.status = Set(status.as_str().to_owned());
        if return_date.is_some() {
            am.return_date = Set(return_date);
        }
        am.updated_at = Set(Some(now()));
        let Some(model) =
            updated_or_missing(am.update(&txn).await, "update book borrow status")?
        else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit book borrow update"))?;
        borrow_from_model(model).map(Some)
    }
}

fn borrow_from_model(model: book_borrows::Model) -> Result<BookBorrow, LibraryServiceError> {
    Ok(BookBorrow {
        status: parse_stored(&model.status)?,
        id: model.id,
        user_id: model.user_id,
        book_title: model.book_title,
        isbn: model.isbn,
        borrow_date: model.borrow_date,
        due_date: model.due_date,
        return_date: model.return_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Card application repository ──────────────────────────────────────────────

impl CardApplicationRepository for DbStore {
    async fn list_applications(&self) -> Result<Vec<CardApplication>, LibraryServiceError> {
        library_card_applications::Entity::find()
            .order_by_asc(library_card_applications::Column::CreatedAt)
            .order_by_asc(library_card_applications::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list card applications"))?
            .into_iter()
            .map(application_from_model)
            .collect()
    }

    async fn find_application(
        &self,
        id: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        let model = library_card_applications::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find card application"))?;
        model.map(application_from_model).transpose()
    }

    async fn list_applications_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CardApplication>, LibraryServiceError> {
        library_card_applications::Entity::find()
            .filter(library_card_applications::Column::UserId.eq(user_id))
            .order_by_asc(library_card_applications::Column::CreatedAt)
            .order_by_asc(library_card_applications::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list card applications by user"))?
            .into_iter()
            .map(application_from_model)
            .collect()
    }

    async fn find_application_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        let model = library_card_applications::Entity::find()
            .filter(library_card_applications::Column::EmailLower.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find card application by email"))?;
        model.map(application_from_model).transpose()
    }

    async fn find_application_by_card_number(
        &self,
        card_number: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        let model = library_card_applications::Entity::find()
            .filter(library_card_applications::Column::CardNumber.eq(card_number))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find card application by card number"))?;
        model.map(application_from_model).transpose()
    }

    async fn create_application(
        &self,
        application: NewCardApplication,
    ) -> Result<CardApplication, LibraryServiceError> {
        let model = library_card_applications::ActiveModel {
            id: Set(new_record_id()),
            user_id: Set(application.user_id),
            first_name: Set(application.first_name),
            last_name: Set(application.last_name),
            father_name: Set(application.father_name),
            dob: Set(application.dob),
            class_name: Set(application.class_name),
            field: Set(application.field),
            roll_no: Set(application.roll_no),
            email_lower: Set(application.email.to_lowercase()),
            email: Set(application.email),
            phone: Set(application.phone),
            address_street: Set(application.address_street),
            address_city: Set(application.address_city),
            address_state: Set(application.address_state),
            address_zip: Set(application.address_zip),
            status: Set(application.status.as_str().to_owned()),
            card_number: Set(application.card_number),
            student_id: Set(application.student_id),
            issue_date: Set(application.issue_date),
            valid_through: Set(application.valid_through),
            created_at: Set(now()),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match unique_violation(&e) {
            // The violation message names the index or column on both Postgres and SQLite.
            Some(msg) if msg.contains("card_number") => LibraryServiceError::CardNumberTaken,
            Some(msg) if msg.contains("email") => LibraryServiceError::DuplicateApplication,
            _ => storage_error(e, "create card application"),
        })?;
        application_from_model(model)
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin card application update"))?;
        let Some(model) = library_card_applications::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find card application"))?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.status = Set(status.as_str().to_owned());
        am.updated_at = Set(Some(now()));
        let Some(model) =
            updated_or_missing(am.update(&txn).await, "update card application status")?
        else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit card application update"))?;
        application_from_model(model).map(Some)
    }

    async fn delete_application(&self, id: &str) -> Result<(), LibraryServiceError> {
        library_card_applications::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error(e, "delete card application"))?;
        Ok(())
    }
}

fn application_from_model(
    model: library_card_applications::Model,
) -> Result<CardApplication, LibraryServiceError> {
    Ok(CardApplication {
        status: parse_stored(&model.status)?,
        id: model.id,
        user_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        father_name: model.father_name,
        dob: model.dob,
        class_name: model.class_name,
        field: model.field,
        roll_no: model.roll_no,
        email: model.email,
        phone: model.phone,
        address_street: model.address_street,
        address_city: model.address_city,
        address_state: model.address_state,
        address_zip: model.address_zip,
        card_number: model.card_number,
        student_id: model.student_id,
        issue_date: model.issue_date,
        valid_through: model.valid_through,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Donation repository ──────────────────────────────────────────────────────

impl DonationRepository for DbStore {
    async fn list_donations(&self) -> Result<Vec<Donation>, LibraryServiceError> {
        let models = donations::Entity::find()
            .order_by_asc(donations::Column::CreatedAt)
            .order_by_asc(donations::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list donations"))?;
        Ok(models.into_iter().map(donation_from_model).collect())
    }

    async fn find_donation(&self, id: &str) -> Result<Option<Donation>, LibraryServiceError> {
        let model = donations::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find donation"))?;
        Ok(model.map(donation_from_model))
    }

    async fn create_donation(&self, donation: NewDonation) -> Result<Donation, LibraryServiceError> {
        let model = donations::ActiveModel {
            id: Set(new_record_id()),
            donor_name: Set(donation.donor_name),
            email: Set(donation.email),
            book_title: Set(donation.book_title),
            author: Set(donation.author),
            quantity: Set(donation.quantity),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create donation"))?;
        Ok(donation_from_model(model))
    }

    async fn delete_donation(&self, id: &str) -> Result<(), LibraryServiceError> {
        donations::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error(e, "delete donation"))?;
        Ok(())
    }
}

fn donation_from_model(model: donations::Model) -> Donation {
    Donation {
        id: model.id,
        donor_name: model.donor_name,
        email: model.email,
        book_title: model.book_title,
        author: model.author,
        quantity: model.quantity,
        created_at: model.created_at,
    }
}

// ── Note repository ──────────────────────────────────────────────────────────

impl NoteRepository for DbStore {
    async fn list_notes(&self) -> Result<Vec<Note>, LibraryServiceError> {
        notes::Entity::find()
            .order_by_asc(notes::Column::CreatedAt)
            .order_by_asc(notes::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list notes"))?
            .into_iter()
            .map(note_from_model)
            .collect()
    }

    async fn list_active_notes(&self) -> Result<Vec<Note>, LibraryServiceError> {
        notes::Entity::find()
            .filter(notes::Column::Status.eq(PublishStatus::Active.as_str()))
            .order_by_asc(notes::Column::CreatedAt)
            .order_by_asc(notes::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list active notes"))?
            .into_iter()
            .map(note_from_model)
            .collect()
    }

    async fn list_notes_by_class_and_subject(
        &self,
        class_name: &str,
        subject: &str,
    ) -> Result<Vec<Note>, LibraryServiceError> {
        notes::Entity::find()
            .filter(notes::Column::ClassName.eq(class_name))
            .filter(notes::Column::Subject.eq(subject))
            .filter(notes::Column::Status.eq(PublishStatus::Active.as_str()))
            .order_by_asc(notes::Column::CreatedAt)
            .order_by_asc(notes::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list notes by class and subject"))?
            .into_iter()
            .map(note_from_model)
            .collect()
    }

    async fn find_note(&self, id: &str) -> Result<Option<Note>, LibraryServiceError> {
        let model = notes::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find note"))?;
        model.map(note_from_model).transpose()
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, LibraryServiceError> {
        let model = notes::ActiveModel {
            id: Set(new_record_id()),
            class_name: Set(note.class_name),
            subject: Set(note.subject),
            title: Set(note.title),
            description: Set(note.description),
            pdf_path: Set(note.pdf_path),
            status: Set(note.status.as_str().to_owned()),
            created_at: Set(now()),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create note"))?;
        note_from_model(model)
    }

    async fn update_note(
        &self,
        id: &str,
        patch: NotePatch,
    ) -> Result<Option<Note>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin note update"))?;
        let Some(model) = notes::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find note"))?
        else {
            return Ok(None);
        };
        let mut note = note_from_model(model)?;
        patch.apply(&mut note);
        note.updated_at = Some(now());
        let model = notes::ActiveModel {
            id: Set(note.id),
            class_name: Set(note.class_name),
            subject: Set(note.subject),
            title: Set(note.title),
            description: Set(note.description),
            pdf_path: Set(note.pdf_path),
            status: Set(note.status.as_str().to_owned()),
            created_at: Set(note.created_at),
            updated_at: Set(note.updated_at),
        }
        .update(&txn)
        .await;
        let Some(model) = updated_or_missing(model, "update note")? else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit note update"))?;
        note_from_model(model).map(Some)
    }

    async fn toggle_note_status(&self, id: &str) -> Result<Option<Note>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin note toggle"))?;
        let Some(model) = notes::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find note"))?
        else {
            return Ok(None);
        };
        let next = parse_stored::<PublishStatus>(&model.status)?.toggled();
        let mut am = model.into_active_model();
        am.status = Set(next.as_str().to_owned());
        am.updated_at = Set(Some(now()));
        let Some(model) = updated_or_missing(am.update(&txn).await, "toggle note status")? else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit note toggle"))?;
        note_from_model(model).map(Some)
    }

    async fn delete_note(&self, id: &str) -> Result<(), LibraryServiceError> {
        notes::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error(e, "delete note"))?;
        Ok(())
    }
}

fn note_from_model(model: notes::Model) -> Result<Note, LibraryServiceError> {
    Ok(Note {
        status: parse_stored(&model.status)?,
        id: model.id,
        class_name: model.class_name,
        subject: model.subject,
        title: model.title,
        description: model.description,
        pdf_path: model.pdf_path,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Rare book repository ─────────────────────────────────────────────────────

impl RareBookRepository for DbStore {
    async fn list_rare_books(&self) -> Result<Vec<RareBook>, LibraryServiceError> {
        rare_books::Entity::find()
            .order_by_asc(rare_books::Column::CreatedAt)
            .order_by_asc(rare_books::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list rare books"))?
            .into_iter()
            .map(rare_book_from_model)
            .collect()
    }

    async fn list_active_rare_books(&self) -> Result<Vec<RareBook>, LibraryServiceError> {
        rare_books::Entity::find()
            .filter(rare_books::Column::Status.eq(PublishStatus::Active.as_str()))
            .order_by_asc(rare_books::Column::CreatedAt)
            .order_by_asc(rare_books::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(e, "list active rare books"))?
            .into_iter()
            .map(rare_book_from_model)
            .collect()
    }

    async fn find_rare_book(&self, id: &str) -> Result<Option<RareBook>, LibraryServiceError> {
        let model = rare_books::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find rare book"))?;
        model.map(rare_book_from_model).transpose()
    }

    async fn create_rare_book(&self, book: NewRareBook) -> Result<RareBook, LibraryServiceError> {
        let model = rare_books::ActiveModel {
            id: Set(new_record_id()),
            title: Set(book.title),
            description: Set(book.description),
            category: Set(book.category),
            pdf_path: Set(book.pdf_path),
            status: Set(book.status.as_str().to_owned()),
            created_at: Set(now()),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create rare book"))?;
        rare_book_from_model(model)
    }

    async fn toggle_rare_book_status(
        &self,
        id: &str,
    ) -> Result<Option<RareBook>, LibraryServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin rare book toggle"))?;
        let Some(model) = rare_books::Entity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find rare book"))?
        else {
            return Ok(None);
        };
        let next = parse_stored::<PublishStatus>(&model.status)?.toggled();
        let mut am = model.into_active_model();
        am.status = Set(next.as_str().to_owned());
        am.updated_at = Set(Some(now()));
        let Some(model) = updated_or_missing(am.update(&txn).await, "toggle rare book status")? else {
            return Ok(None);
        };
        txn.commit()
            .await
            .map_err(|e| storage_error(e, "commit rare book toggle"))?;
        rare_book_from_model(model).map(Some)
    }

    async fn delete_rare_book(&self, id: &str) -> Result<(), LibraryServiceError> {
        rare_books::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error(e, "delete rare book"))?;
        Ok(())
    }
}

fn rare_book_from_model(model: rare_books::Model) -> Result<RareBook, LibraryServiceError> {
    Ok(RareBook {
        status: parse_stored(&model.status)?,
        id: model.id,
        title: model.title,
        description: model.description,
        category: model.category,
        pdf_path: model.pdf_path,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl HealthCheck for DbStore {
    async fn ping(&self) -> Result<(), LibraryServiceError> {
        self.db
            .ping()
            .await
            .map_err(|e| storage_error(e, "ping database"))
    }
}
