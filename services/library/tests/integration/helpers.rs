use axum::http::HeaderValue;
use axum_test::{TestResponse, TestServer};
use chrono::NaiveDate;

use gcmn_auth_types::cookie::GCMN_SESSION;
use gcmn_auth_types::session::SessionKey;
use gcmn_domain::status::{ApplicationStatus, PublishStatus, UserKind};
use gcmn_library::domain::types::{
    NewBookBorrow, NewCardApplication, NewContactMessage, NewDonation, NewNote, NewRareBook,
    NewUser, now,
};
use gcmn_library::infra::json::JsonStore;
use gcmn_library::router::build_router;
use gcmn_library::state::AppState;
use gcmn_library::usecase::account::AdminCredentials;
use gcmn_testing::auth::MockSession;
use gcmn_testing::fixture::DataDir;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-integration-tests";
pub const ADMIN_EMAIL: &str = "admin@gcmn.edu.pk";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const ADMIN_SECRET_KEY: &str = "admin-secret-key";

// ── Server fixture ───────────────────────────────────────────────────────────

/// A running router over a document store in a scratch directory.
///
/// Holds the directory so it outlives the server.
pub struct TestApp {
    pub server: TestServer,
    pub store: JsonStore,
    pub data: DataDir,
}

pub async fn test_app() -> TestApp {
    let data = DataDir::new();
    let store = JsonStore::open(data.data_file()).await.unwrap();
    let admin = AdminCredentials {
        email: ADMIN_EMAIL.to_owned(),
        password: ADMIN_PASSWORD.to_owned(),
        secret_key: ADMIN_SECRET_KEY.to_owned(),
    };
    let state = AppState::new(
        store.clone(),
        SessionKey::new(TEST_SESSION_SECRET),
        admin,
        None,
    );
    let server = TestServer::new(build_router(state)).unwrap();
    TestApp {
        server,
        store,
        data,
    }
}

/// `Cookie` request header carrying the session set by `response`.
///
/// Session cookies are marked `Secure`, so they are replayed by hand rather
/// than through the client's cookie jar.
pub fn session_from(response: &TestResponse) -> HeaderValue {
    let cookie = response.cookie(GCMN_SESSION);
    HeaderValue::from_str(&format!("{}={}", cookie.name(), cookie.value())).unwrap()
}

/// `Cookie` request header for a session minted directly.
pub fn session_header(session: &MockSession) -> HeaderValue {
    HeaderValue::from_str(&session.cookie(TEST_SESSION_SECRET)).unwrap()
}

// ── Record fixtures ──────────────────────────────────────────────────────────

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_owned(),
        password_hash: "not-a-real-hash".to_owned(),
        full_name: "Bilal Ahmed".to_owned(),
        phone: None,
        roll_number: Some("17".to_owned()),
        department: None,
        student_class: Some("Class 11".to_owned()),
        kind: UserKind::Student,
    }
}

pub fn new_application(email: &str, card_number: &str) -> NewCardApplication {
    let issue_date = now().date_naive();
    NewCardApplication {
        user_id: None,
        first_name: "Ayesha".to_owned(),
        last_name: "Malik".to_owned(),
        father_name: None,
        dob: NaiveDate::from_ymd_opt(2007, 3, 14),
        class_name: "Class 12".to_owned(),
        field: Some("Computer Science".to_owned()),
        roll_no: "5".to_owned(),
        email: email.to_owned(),
        phone: "0300-1234567".to_owned(),
        address_street: "12 College Road".to_owned(),
        address_city: "Multan".to_owned(),
        address_state: "Punjab".to_owned(),
        address_zip: "60000".to_owned(),
        status: ApplicationStatus::Pending,
        card_number: card_number.to_owned(),
        student_id: "GCMN-5".to_owned(),
        issue_date,
        valid_through: issue_date + chrono::Days::new(365),
    }
}

pub fn new_message() -> NewContactMessage {
    NewContactMessage {
        name: "Hamza".to_owned(),
        email: "hamza@example.com".to_owned(),
        subject: "Opening hours".to_owned(),
        message: "Is the library open on Saturday?".to_owned(),
    }
}

pub fn new_borrow(user_id: &str) -> NewBookBorrow {
    NewBookBorrow {
        user_id: user_id.to_owned(),
        book_title: "Physics Part II".to_owned(),
        isbn: "978-969-0-00000-1".to_owned(),
        borrow_date: now(),
        due_date: None,
    }
}

pub fn new_donation() -> NewDonation {
    NewDonation {
        donor_name: "Sana".to_owned(),
        email: None,
        book_title: "Urdu Adab".to_owned(),
        author: None,
        quantity: 3,
    }
}

pub fn new_note(class_name: &str, subject: &str) -> NewNote {
    NewNote {
        class_name: class_name.to_owned(),
        subject: subject.to_owned(),
        title: "Chapter 1".to_owned(),
        description: "Kinematics summary".to_owned(),
        pdf_path: "/uploads/notes/ch1.pdf".to_owned(),
        status: PublishStatus::Active,
    }
}

pub fn new_rare_book() -> NewRareBook {
    NewRareBook {
        title: "Diwan-e-Ghalib".to_owned(),
        description: "1877 print".to_owned(),
        category: "Poetry".to_owned(),
        pdf_path: "/uploads/rare/ghalib.pdf".to_owned(),
        status: PublishStatus::Active,
    }
}
