use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use gcmn_core::error::AppError;
use gcmn_core::health::healthz;
use gcmn_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::domain::repository::Storage;
use crate::handlers::{admin, auth, borrow, card_application, catalog, contact, donation, health};
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound
}

fn api_routes<S: Storage>() -> Router<AppState<S>> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/logout", post(auth::logout::<S>))
        .route("/auth/me", get(auth::me::<S>))
        // Profile
        .route(
            "/profile",
            get(auth::get_profile::<S>).put(auth::update_profile::<S>),
        )
        // Admin dashboards
        .route("/admin/users", get(admin::list_users::<S>))
        .route("/admin/library-cards", get(admin::list_library_cards::<S>))
        .route("/admin/borrowed-books", get(admin::list_borrowed_books::<S>))
        .route("/admin/stats", get(admin::stats::<S>))
        // Contact messages
        .route(
            "/contact-messages",
            get(contact::list_messages::<S>).post(contact::send_message::<S>),
        )
        .route("/contact-messages/{id}/seen", patch(contact::mark_seen::<S>))
        .route(
            "/contact-messages/{id}",
            delete(contact::delete_message::<S>),
        )
        // Book borrows
        .route(
            "/book-borrows",
            get(borrow::list_borrows::<S>).post(borrow::borrow_book::<S>),
        )
        .route("/book-borrows/{id}/status", patch(borrow::update_status::<S>))
        // Library card applications
        .route(
            "/library-card-applications",
            get(card_application::list_applications::<S>)
                .post(card_application::submit_application::<S>),
        )
        .route(
            "/library-card-applications/{id}/status",
            patch(card_application::update_status::<S>),
        )
        .route(
            "/library-card-applications/{id}",
            get(card_application::get_application::<S>)
                .delete(card_application::delete_application::<S>),
        )
        // Donations
        .route(
            "/donations",
            get(donation::list_donations::<S>).post(donation::donate::<S>),
        )
        .route(
            "/donations/{id}",
            delete(donation::delete_donation::<S>),
        )
        // Notes
        .route("/notes", get(catalog::list_active_notes::<S>))
        .route("/notes/filter", get(catalog::filter_notes::<S>))
        .route(
            "/admin/notes",
            get(catalog::list_notes::<S>).post(catalog::create_note::<S>),
        )
        .route(
            "/admin/notes/{id}",
            patch(catalog::update_note::<S>).delete(catalog::delete_note::<S>),
        )
        .route("/admin/notes/{id}/toggle", patch(catalog::toggle_note::<S>))
        // Rare books
        .route("/rare-books", get(catalog::list_active_rare_books::<S>))
        .route(
            "/admin/rare-books",
            get(catalog::list_rare_books::<S>).post(catalog::create_rare_book::<S>),
        )
        .route(
            "/admin/rare-books/{id}",
            delete(catalog::delete_rare_book::<S>),
        )
        .route(
            "/admin/rare-books/{id}/toggle",
            patch(catalog::toggle_rare_book::<S>),
        )
}

pub fn build_router<S: Storage>(state: AppState<S>) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(health::readyz::<S>))
        .nest("/api", api_routes::<S>())
        .fallback(not_found)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
