use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, BorrowStatus, PublishStatus, UserKind};
use gcmn_library::domain::repository::{
    CardApplicationRepository, RareBookRepository, Storage, UserRepository,
};
use gcmn_library::domain::types::{NotePatch, ProfilePatch, now};
use gcmn_library::error::LibraryServiceError;
use gcmn_library::infra::db::DbStore;
use gcmn_library::infra::json::JsonStore;
use gcmn_library::usecase::card_application::{
    SubmissionGate, SubmitApplicationInput, SubmitApplicationUseCase,
};
use gcmn_testing::fixture::DataDir;

use crate::helpers::{
    new_application, new_borrow, new_donation, new_message, new_note, new_rare_book, new_user,
};

// Every backend must pass the same checks.

async fn users_and_roles<S: Storage>(store: &S) {
    let user = store.create_user(new_user("bilal@example.com")).await.unwrap();
    assert_eq!(store.find_user(&user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(
        store
            .find_user_by_email("bilal@example.com")
            .await
            .unwrap()
            .map(|u| u.id),
        Some(user.id.clone())
    );
    assert!(store.find_user("missing").await.unwrap().is_none());

    let err = store.create_user(new_user("bilal@example.com")).await.unwrap_err();
    assert!(
        matches!(err, LibraryServiceError::EmailAlreadyRegistered),
        "expected EmailAlreadyRegistered, got {err:?}"
    );

    let students = store.list_users_by_kind(UserKind::Student).await.unwrap();
    assert_eq!(students.len(), 1);
    assert!(store.list_users_by_kind(UserKind::User).await.unwrap().is_empty());

    assert!(!store.has_role(&user.id, AppRole::Admin).await.unwrap());
    let grant = store.grant_role(&user.id, AppRole::Admin).await.unwrap();
    assert_eq!(store.grant_role(&user.id, AppRole::Admin).await.unwrap(), grant);
    assert!(store.has_role(&user.id, AppRole::Admin).await.unwrap());
    assert_eq!(store.list_roles(&user.id).await.unwrap(), vec![grant]);

    assert!(store.find_profile(&user.id).await.unwrap().is_none());
    let created = store
        .upsert_profile(
            &user.id,
            ProfilePatch {
                full_name: Some("Bilal Ahmed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(created.updated_at.is_none());
    assert_eq!(store.find_profile(&user.id).await.unwrap(), Some(created.clone()));
    let updated = store
        .upsert_profile(
            &user.id,
            ProfilePatch {
                phone: Some("0301-7654321".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.full_name, "Bilal Ahmed");
    assert_eq!(updated.phone.as_deref(), Some("0301-7654321"));
    assert!(updated.updated_at.is_some());
    assert_eq!(store.find_profile(&user.id).await.unwrap(), Some(updated));
}

async fn card_applications<S: Storage>(store: &S) {
    let app = store
        .create_application(new_application("ayesha@example.com", "CS-5-12"))
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Pending);
    assert_eq!(app.card_number, "CS-5-12");
    assert_eq!(store.find_application(&app.id).await.unwrap(), Some(app.clone()));
    assert_eq!(
        store
            .find_application_by_email("AYESHA@example.com")
            .await
            .unwrap(),
        Some(app.clone())
    );
    assert_eq!(
        store
            .find_application_by_card_number("CS-5-12")
            .await
            .unwrap(),
        Some(app.clone())
    );

    let dup_email = store
        .create_application(new_application("Ayesha@Example.com", "CS-5-12-1"))
        .await
        .unwrap_err();
    assert!(
        matches!(dup_email, LibraryServiceError::DuplicateApplication),
        "expected DuplicateApplication, got {dup_email:?}"
    );
    let dup_card = store
        .create_application(new_application("other@example.com", "CS-5-12"))
        .await
        .unwrap_err();
    assert!(
        matches!(dup_card, LibraryServiceError::CardNumberTaken),
        "expected CardNumberTaken, got {dup_card:?}"
    );

    let approved = store
        .update_application_status(&app.id, ApplicationStatus::Approved)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert!(approved.updated_at.is_some());
    assert_eq!(store.find_application(&app.id).await.unwrap(), Some(approved));
    assert!(
        store
            .update_application_status("missing", ApplicationStatus::Rejected)
            .await
            .unwrap()
            .is_none()
    );

    store.delete_application(&app.id).await.unwrap();
    store.delete_application(&app.id).await.unwrap();
    assert!(store.find_application(&app.id).await.unwrap().is_none());
    assert!(store.list_applications().await.unwrap().is_empty());

    // Case folding beyond ASCII.
    let umlaut = store
        .create_application(new_application("ÄLI@example.com", "PRE-ENG-9-11"))
        .await
        .unwrap();
    assert_eq!(
        store
            .find_application_by_email("äli@example.com")
            .await
            .unwrap(),
        Some(umlaut.clone())
    );
    let dup_umlaut = store
        .create_application(new_application("äli@EXAMPLE.com", "PRE-ENG-9-11-1"))
        .await
        .unwrap_err();
    assert!(
        matches!(dup_umlaut, LibraryServiceError::DuplicateApplication),
        "expected DuplicateApplication, got {dup_umlaut:?}"
    );
    store.delete_application(&umlaut.id).await.unwrap();
}

async fn borrows<S: Storage>(store: &S) {
    let borrow = store.create_borrow(new_borrow("user-1")).await.unwrap();
    assert_eq!(borrow.status, BorrowStatus::Borrowed);
    assert!(borrow.return_date.is_none());
    assert_eq!(store.find_borrow(&borrow.id).await.unwrap(), Some(borrow.clone()));
    store.create_borrow(new_borrow("user-2")).await.unwrap();

    assert_eq!(store.list_borrows().await.unwrap().len(), 2);
    let mine = store.list_borrows_by_user("user-1").await.unwrap();
    assert_eq!(mine, vec![borrow.clone()]);

    let returned_at = now();
    let returned = store
        .update_borrow_status(&borrow.id, BorrowStatus::Returned, Some(returned_at))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(returned.status, BorrowStatus::Returned);
    assert_eq!(returned.return_date, Some(returned_at));
    assert_eq!(store.find_borrow(&borrow.id).await.unwrap(), Some(returned));
    assert!(
        store
            .update_borrow_status("missing", BorrowStatus::Returned, None)
            .await
            .unwrap()
            .is_none()
    );
}

async fn messages_and_donations<S: Storage>(store: &S) {
    let message = store.create_message(new_message()).await.unwrap();
    assert!(!message.is_seen);
    assert_eq!(store.find_message(&message.id).await.unwrap(), Some(message.clone()));
    let seen = store
        .set_message_seen(&message.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(seen.is_seen);
    assert_eq!(store.find_message(&message.id).await.unwrap(), Some(seen));
    assert!(store.set_message_seen("missing", true).await.unwrap().is_none());
    store.delete_message(&message.id).await.unwrap();
    store.delete_message(&message.id).await.unwrap();
    assert!(store.list_messages().await.unwrap().is_empty());

    let donation = store.create_donation(new_donation()).await.unwrap();
    assert_eq!(donation.quantity, 3);
    assert_eq!(donation.book_title, "Urdu Adab");
    assert_eq!(store.find_donation(&donation.id).await.unwrap(), Some(donation.clone()));
    store.delete_donation(&donation.id).await.unwrap();
    assert!(store.list_donations().await.unwrap().is_empty());
}

async fn catalog<S: Storage>(store: &S) {
    let physics = store.create_note(new_note("Class 11", "Physics")).await.unwrap();
    store.create_note(new_note("Class 12", "Physics")).await.unwrap();
    assert_eq!(store.find_note(&physics.id).await.unwrap(), Some(physics.clone()));

    let filtered = store
        .list_notes_by_class_and_subject("Class 11", "Physics")
        .await
        .unwrap();
    assert_eq!(filtered, vec![physics.clone()]);

    let hidden = store.toggle_note_status(&physics.id).await.unwrap().unwrap();
    assert_eq!(hidden.status, PublishStatus::Inactive);
    assert_eq!(store.list_active_notes().await.unwrap().len(), 1);
    assert_eq!(store.list_notes().await.unwrap().len(), 2);
    assert!(
        store
            .list_notes_by_class_and_subject("Class 11", "Physics")
            .await
            .unwrap()
            .is_empty()
    );
    let shown = store.toggle_note_status(&physics.id).await.unwrap().unwrap();
    assert_eq!(shown.status, PublishStatus::Active);
    assert_eq!(store.find_note(&physics.id).await.unwrap(), Some(shown));

    let renamed = store
        .update_note(
            &physics.id,
            NotePatch {
                title: Some("Chapter 2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "Chapter 2");
    assert_eq!(renamed.subject, "Physics");
    assert_eq!(store.find_note(&physics.id).await.unwrap(), Some(renamed));
    assert!(
        store
            .update_note("missing", NotePatch::default())
            .await
            .unwrap()
            .is_none()
    );
    store.delete_note(&physics.id).await.unwrap();
    assert!(store.find_note(&physics.id).await.unwrap().is_none());

    let book = store.create_rare_book(new_rare_book()).await.unwrap();
    assert_eq!(store.find_rare_book(&book.id).await.unwrap(), Some(book.clone()));
    let archived = store.toggle_rare_book_status(&book.id).await.unwrap().unwrap();
    assert_eq!(archived.status, PublishStatus::Inactive);
    assert_eq!(store.find_rare_book(&book.id).await.unwrap(), Some(archived));
    assert!(store.list_active_rare_books().await.unwrap().is_empty());
    assert_eq!(store.list_rare_books().await.unwrap().len(), 1);
    assert!(store.toggle_rare_book_status("missing").await.unwrap().is_none());
    store.delete_rare_book(&book.id).await.unwrap();
    store.delete_rare_book(&book.id).await.unwrap();
    assert!(store.list_rare_books().await.unwrap().is_empty());
}

async fn exercise<S: Storage>(store: S) {
    store.ping().await.unwrap();
    users_and_roles(&store).await;
    card_applications(&store).await;
    borrows(&store).await;
    messages_and_donations(&store).await;
    catalog(&store).await;
}

// ── Document store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn json_store_meets_storage_contract() {
    let dir = DataDir::new();
    let store = JsonStore::open(dir.data_file()).await.unwrap();
    exercise(store).await;
}

#[tokio::test]
async fn json_store_survives_reopen() {
    let dir = DataDir::new();
    let store = JsonStore::open(dir.data_file()).await.unwrap();
    let user = store.create_user(new_user("bilal@example.com")).await.unwrap();
    drop(store);

    let reopened = JsonStore::open(dir.data_file()).await.unwrap();
    assert_eq!(reopened.find_user(&user.id).await.unwrap(), Some(user));

    let document = dir.read_document();
    assert_eq!(document["users"].as_array().unwrap().len(), 1);
    assert!(document["notes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn json_store_refuses_corrupt_file() {
    let dir = DataDir::new();
    std::fs::write(dir.data_file(), b"{ not json").unwrap();
    assert!(JsonStore::open(dir.data_file()).await.is_err());
    assert_eq!(std::fs::read(dir.data_file()).unwrap(), b"{ not json");
}

#[tokio::test]
async fn json_store_fills_missing_collections() {
    let dir = DataDir::new();
    dir.seed(&serde_json::json!({ "users": [] }));
    let store = JsonStore::open(dir.data_file()).await.unwrap();
    assert!(store.list_rare_books().await.unwrap().is_empty());
}

// ── Relational store ─────────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_store_meets_storage_contract() {
    let dir = DataDir::new();
    let store = DbStore::connect(&dir.sqlite_url()).await.unwrap();
    exercise(store).await;
}

fn form(email: &str) -> SubmitApplicationInput {
    SubmitApplicationInput {
        first_name: Some("Ayesha".into()),
        last_name: Some("Malik".into()),
        class_name: Some("Class 12".into()),
        field: Some("Computer Science".into()),
        roll_no: Some("5".into()),
        email: Some(email.into()),
        phone: Some("0300-1234567".into()),
        address_street: Some("12 College Road".into()),
        address_city: Some("Multan".into()),
        address_state: Some("Punjab".into()),
        address_zip: Some("60000".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn sqlite_submission_suffixes_taken_card_number_and_rejects_recased_email() {
    let dir = DataDir::new();
    let store = DbStore::connect(&dir.sqlite_url()).await.unwrap();
    store
        .create_application(new_application("held@example.com", "CS-5-12"))
        .await
        .unwrap();

    let usecase = SubmitApplicationUseCase {
        repo: store.clone(),
        gate: SubmissionGate::new(),
    };
    let submitted = usecase.execute(form("Zainab@Example.com")).await.unwrap();
    assert_eq!(submitted.card_number, "CS-5-12-1");
    assert_eq!(
        store.find_application(&submitted.id).await.unwrap(),
        Some(submitted)
    );

    let err = usecase
        .execute(form("zainab@example.COM"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, LibraryServiceError::DuplicateApplication),
        "expected DuplicateApplication, got {err:?}"
    );
    assert_eq!(store.list_applications().await.unwrap().len(), 2);
}
