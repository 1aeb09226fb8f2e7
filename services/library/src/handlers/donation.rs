use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use gcmn_auth_types::session::Session;

use crate::domain::repository::Storage;
use crate::domain::types::Donation;
use crate::error::LibraryServiceError;
use crate::handlers::{Success, success};
use crate::policy::require_admin;
use crate::state::AppState;
use crate::usecase::donation::{
    DeleteDonationUseCase, DonateInput, DonateUseCase, ListDonationsUseCase,
};

// ── GET /donations ───────────────────────────────────────────────────────────

pub async fn list_donations<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Donation>>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let usecase = ListDonationsUseCase { repo: state.repo() };
    Ok(Json(usecase.execute().await?))
}

// ── POST /donations ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateRequest {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub book_title: Option<String>,
    pub author: Option<String>,
    pub quantity: Option<i32>,
}

pub async fn donate<S: Storage>(
    State(state): State<AppState<S>>,
    Json(body): Json<DonateRequest>,
) -> Result<(StatusCode, Json<Donation>), LibraryServiceError> {
    let usecase = DonateUseCase { repo: state.repo() };
    let donation = usecase
        .execute(DonateInput {
            donor_name: body.donor_name,
            email: body.email,
            book_title: body.book_title,
            author: body.author,
            quantity: body.quantity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

// ── DELETE /donations/{id} ───────────────────────────────────────────────────

pub async fn delete_donation<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    DeleteDonationUseCase { repo: state.repo() }
        .execute(&id)
        .await?;
    Ok(success())
}
