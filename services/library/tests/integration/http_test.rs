use axum::http::{StatusCode, header};
use serde_json::{Value, json};

use gcmn_domain::role::AppRole;
use gcmn_library::domain::repository::UserRoleRepository;
use gcmn_testing::auth::MockSession;

use crate::helpers::{
    ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_SECRET_KEY, TestApp, session_from, session_header,
    test_app,
};

fn application_form(email: &str) -> Value {
    json!({
        "firstName": "Ayesha",
        "lastName": "Malik",
        "fatherName": "Tariq Malik",
        "dob": "2007-03-14",
        "email": email,
        "phone": "0300-1234567",
        "field": "Computer Science",
        "rollNo": "5",
        "studentClass": "Class 12",
        "addressStreet": "12 College Road",
        "addressCity": "Multan",
        "addressState": "Punjab",
        "addressZip": "60000"
    })
}

async fn register(app: &TestApp, email: &str) -> (String, axum::http::HeaderValue) {
    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": "correct horse",
            "fullName": "Bilal Ahmed",
            "studentClass": "Class 11"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["user"]["id"].as_str().unwrap().to_owned();
    (id, session_from(&response))
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_live_and_ready() {
    let app = test_app().await;
    assert_eq!(app.server.get("/healthz").await.status_code(), StatusCode::OK);
    assert_eq!(app.server.get("/readyz").await.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_return_json_404_for_unknown_routes() {
    let app = test_app().await;
    let response = app.server.get("/api/nope").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "NOT_FOUND");
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_and_describe_session() {
    let app = test_app().await;
    let (user_id, cookie) = register(&app, "bilal@example.com").await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header(header::COOKIE, cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["roles"], json!(["user"]));
    assert_eq!(body["profile"]["fullName"], "Bilal Ahmed");
}

#[tokio::test]
async fn should_reject_duplicate_registration() {
    let app = test_app().await;
    register(&app, "bilal@example.com").await;
    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "bilal@example.com",
            "password": "another",
            "fullName": "Someone Else"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["kind"], "EMAIL_ALREADY_REGISTERED");
}

#[tokio::test]
async fn should_login_with_password_and_reject_wrong_one() {
    let app = test_app().await;
    register(&app, "bilal@example.com").await;

    let wrong = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "bilal@example.com", "password": "wrong" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let ok = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "bilal@example.com", "password": "correct horse" }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
    let body: Value = ok.json();
    assert_eq!(body["user"]["email"], "bilal@example.com");
    assert!(body.get("redirect").is_none());
}

#[tokio::test]
async fn should_login_fixed_admin_with_secret_key() {
    let app = test_app().await;
    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD,
            "secretKey": ADMIN_SECRET_KEY
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["redirect"], "/admin-dashboard");

    let me = app
        .server
        .get("/api/auth/me")
        .add_header(header::COOKIE, session_from(&response))
        .await;
    assert_eq!(me.json::<Value>()["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn should_require_session_for_me() {
    let app = test_app().await;
    let response = app.server.get("/api/auth/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ── Library card applications ────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_card_numbers_with_collision_suffix() {
    let app = test_app().await;

    let first = app
        .server
        .post("/api/library-card-applications")
        .json(&application_form("ayesha@example.com"))
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);
    let first: Value = first.json();
    assert_eq!(first["cardNumber"], "CS-5-12");
    assert_eq!(first["status"], "pending");

    let second: Value = app
        .server
        .post("/api/library-card-applications")
        .json(&application_form("zainab@example.com"))
        .await
        .json();
    assert_eq!(second["cardNumber"], "CS-5-12-1");

    let duplicate = app
        .server
        .post("/api/library-card-applications")
        .json(&application_form("AYESHA@example.com"))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    assert_eq!(duplicate.json::<Value>()["kind"], "DUPLICATE_APPLICATION");
}

#[tokio::test]
async fn should_reject_incomplete_application() {
    let app = test_app().await;
    let mut form = application_form("ayesha@example.com");
    form.as_object_mut().unwrap().remove("phone");
    let response = app
        .server
        .post("/api/library-card-applications")
        .json(&form)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "MISSING_FIELD");
}

#[tokio::test]
async fn should_allow_card_login_only_after_approval() {
    let app = test_app().await;
    let application: Value = app
        .server
        .post("/api/library-card-applications")
        .json(&application_form("ayesha@example.com"))
        .await
        .json();
    let id = application["id"].as_str().unwrap();

    let pending = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "libraryCardId": "CS-5-12" }))
        .await;
    assert_eq!(pending.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(pending.json::<Value>()["kind"], "CARD_NOT_APPROVED");

    let admin = session_header(&MockSession::admin());
    let approved = app
        .server
        .patch(&format!("/api/library-card-applications/{id}/status"))
        .add_header(header::COOKIE, admin)
        .json(&json!({ "status": "approved" }))
        .await;
    assert_eq!(approved.status_code(), StatusCode::OK);
    assert_eq!(approved.json::<Value>()["status"], "approved");

    let login = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "libraryCardId": "CS-5-12" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);

    let me: Value = app
        .server
        .get("/api/auth/me")
        .add_header(header::COOKIE, session_from(&login))
        .await
        .json();
    assert_eq!(me["isLibraryCard"], true);
    assert_eq!(me["user"]["cardNumber"], "CS-5-12");
    assert_eq!(me["user"]["name"], "Ayesha Malik");
}

#[tokio::test]
async fn should_show_application_only_to_owner_and_admin() {
    let app = test_app().await;
    let (user_id, owner) = register(&app, "ayesha@example.com").await;
    let (_, stranger) = register(&app, "zainab@example.com").await;

    let created: Value = app
        .server
        .post("/api/library-card-applications")
        .add_header(header::COOKIE, owner.clone())
        .json(&application_form("ayesha@example.com"))
        .await
        .json();
    assert_eq!(created["userId"], user_id.as_str());
    let path = format!("/api/library-card-applications/{}", created["id"].as_str().unwrap());

    let own = app
        .server
        .get(&path)
        .add_header(header::COOKIE, owner)
        .await;
    assert_eq!(own.status_code(), StatusCode::OK);

    let other = app
        .server
        .get(&path)
        .add_header(header::COOKIE, stranger)
        .await;
    assert_eq!(other.status_code(), StatusCode::NOT_FOUND);

    let admin = app
        .server
        .get(&path)
        .add_header(header::COOKIE, session_header(&MockSession::admin()))
        .await;
    assert_eq!(admin.status_code(), StatusCode::OK);

    assert_eq!(
        app.server.get(&path).await.status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn should_reject_unknown_card_number() {
    let app = test_app().await;
    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "libraryCardId": "CS-9-99" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_CARD_NUMBER");
}

// ── Admin gating ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_gate_admin_routes() {
    let app = test_app().await;
    let (user_id, cookie) = register(&app, "bilal@example.com").await;

    let anonymous = app.server.get("/api/admin/stats").await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let forbidden = app
        .server
        .get("/api/admin/stats")
        .add_header(header::COOKIE, cookie.clone())
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    app.store.grant_role(&user_id, AppRole::Admin).await.unwrap();
    let allowed = app
        .server
        .get("/api/admin/stats")
        .add_header(header::COOKIE, cookie)
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    let stats: Value = allowed.json();
    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(stats["libraryCards"], 0);
}

#[tokio::test]
async fn should_split_user_directory_without_password_hashes() {
    let app = test_app().await;
    register(&app, "bilal@example.com").await;
    app.server
        .post("/api/auth/register")
        .json(&json!({
            "email": "guest@example.com",
            "password": "pw",
            "fullName": "Guest Reader"
        }))
        .await;

    let response = app
        .server
        .get("/api/admin/users")
        .add_header(header::COOKIE, session_header(&MockSession::admin()))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["students"].as_array().unwrap().len(), 1);
    assert_eq!(body["nonStudents"].as_array().unwrap().len(), 1);
    assert!(body["students"][0].get("passwordHash").is_none());
}

// ── Book borrows ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_borrow_and_return_book() {
    let app = test_app().await;
    let (user_id, cookie) = register(&app, "bilal@example.com").await;
    let admin = session_header(&MockSession::admin());

    let created = app
        .server
        .post("/api/book-borrows")
        .add_header(header::COOKIE, cookie.clone())
        .json(&json!({ "bookTitle": "Physics Part II", "isbn": "978-969-0-00000-1" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let borrow: Value = created.json();
    assert_eq!(borrow["userId"], user_id.as_str());
    assert_eq!(borrow["status"], "borrowed");
    let id = borrow["id"].as_str().unwrap();

    let mine: Value = app
        .server
        .get("/api/book-borrows")
        .add_header(header::COOKIE, cookie.clone())
        .await
        .json();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let returned = app
        .server
        .patch(&format!("/api/book-borrows/{id}/status"))
        .add_header(header::COOKIE, admin.clone())
        .json(&json!({ "status": "returned" }))
        .await;
    assert_eq!(returned.status_code(), StatusCode::OK);
    let returned: Value = returned.json();
    assert_eq!(returned["status"], "returned");
    assert!(returned["returnDate"].is_string());

    let reopened = app
        .server
        .patch(&format!("/api/book-borrows/{id}/status"))
        .add_header(header::COOKIE, admin)
        .json(&json!({ "status": "borrowed" }))
        .await;
    assert_eq!(reopened.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn should_reject_unknown_borrow_status() {
    let app = test_app().await;
    let response = app
        .server
        .patch("/api/book-borrows/any/status")
        .add_header(header::COOKIE, session_header(&MockSession::admin()))
        .json(&json!({ "status": "lost" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ── Notes and contact ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_publish_and_filter_notes() {
    let app = test_app().await;
    let admin = session_header(&MockSession::admin());

    let created = app
        .server
        .post("/api/admin/notes")
        .add_header(header::COOKIE, admin.clone())
        .json(&json!({
            "class": "Class 11",
            "subject": "Physics",
            "title": "Chapter 1",
            "description": "Kinematics",
            "pdfPath": "/uploads/notes/ch1.pdf"
        }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_str().unwrap().to_owned();

    let filtered: Value = app
        .server
        .get("/api/notes/filter")
        .add_query_param("class", "Class 11")
        .add_query_param("subject", "Physics")
        .await
        .json();
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let missing = app
        .server
        .get("/api/notes/filter")
        .add_query_param("class", "Class 11")
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    app.server
        .patch(&format!("/api/admin/notes/{id}/toggle"))
        .add_header(header::COOKIE, admin)
        .await;
    let public: Value = app.server.get("/api/notes").await.json();
    assert!(public.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn should_accept_contact_message_from_anyone() {
    let app = test_app().await;
    let sent = app
        .server
        .post("/api/contact-messages")
        .json(&json!({
            "name": "Hamza",
            "email": "hamza@example.com",
            "subject": "Opening hours",
            "message": "Open on Saturday?"
        }))
        .await;
    assert_eq!(sent.status_code(), StatusCode::CREATED);
    assert_eq!(sent.json::<Value>()["isSeen"], false);

    let listed = app
        .server
        .get("/api/contact-messages")
        .add_header(header::COOKIE, session_header(&MockSession::admin()))
        .await;
    assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);
}
