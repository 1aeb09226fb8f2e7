use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use gcmn_auth_types::session::{MaybeSession, Session};
use gcmn_auth_types::token::Principal;
use gcmn_domain::status::ApplicationStatus;

use crate::domain::repository::Storage;
use crate::domain::types::CardApplication;
use crate::error::LibraryServiceError;
use crate::handlers::{Success, parse_date, success};
use crate::policy::{is_admin, owner_scope, require_admin, require_authenticated};
use crate::state::AppState;
use crate::usecase::card_application::{
    DeleteApplicationUseCase, GetApplicationUseCase, ListApplicationsUseCase,
    SubmitApplicationInput, SubmitApplicationUseCase, TransitionApplicationUseCase,
};

// ── GET /library-card-applications ───────────────────────────────────────────

pub async fn list_applications<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<CardApplication>>, LibraryServiceError> {
    let scope = owner_scope(&state.store, &principal).await?;
    let usecase = ListApplicationsUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(scope.as_deref()).await?))
}

// ── POST /library-card-applications ──────────────────────────────────────────

/// The class may arrive as `studentClass` or `class`; the former wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub field: Option<String>,
    pub roll_no: Option<String>,
    pub student_class: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
}

/// Open to anonymous applicants; a signed-in user is recorded as the owner.
pub async fn submit_application<S: Storage>(
    MaybeSession(principal): MaybeSession,
    State(state): State<AppState<S>>,
    Json(body): Json<SubmitApplicationRequest>,
) -> Result<(StatusCode, Json<CardApplication>), LibraryServiceError> {
    let user_id = match principal {
        Some(Principal::User { user_id }) => Some(user_id),
        _ => None,
    };
    let input = SubmitApplicationInput {
        user_id,
        first_name: body.first_name,
        last_name: body.last_name,
        father_name: body.father_name,
        dob: parse_date("dob", body.dob)?,
        class_name: body
            .student_class
            .filter(|c| !c.trim().is_empty())
            .or(body.class_name),
        field: body.field,
        roll_no: body.roll_no,
        email: body.email,
        phone: body.phone,
        address_street: body.address_street,
        address_city: body.address_city,
        address_state: body.address_state,
        address_zip: body.address_zip,
    };
    let usecase = SubmitApplicationUseCase {
        repo: state.repo(),
        gate: state.submissions.clone(),
    };
    let application = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

// ── GET /library-card-applications/{id} ──────────────────────────────────────

/// Admins see any application; users only their own, card holders only theirs.
/// Anything else reads as not found.
pub async fn get_application<S: Storage>(
    MaybeSession(principal): MaybeSession,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<CardApplication>, LibraryServiceError> {
    let principal = require_authenticated(principal)?;
    let application = GetApplicationUseCase { repo: state.repo() }
        .execute(&id)
        .await?;
    let visible = is_admin(&state.store, &principal).await?
        || match &principal {
            Principal::User { user_id } => application.user_id.as_ref() == Some(user_id),
            Principal::Card { application_id } => *application_id == application.id,
            Principal::Admin => true,
        };
    if !visible {
        return Err(LibraryServiceError::ApplicationNotFound);
    }
    Ok(Json(application))
}

// ── PATCH /library-card-applications/{id}/status ─────────────────────────────

#[derive(Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: Option<String>,
}

pub async fn update_status<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(body): Json<ApplicationStatusRequest>,
) -> Result<Json<CardApplication>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    let status: ApplicationStatus = body
        .status
        .ok_or(LibraryServiceError::MissingField("status"))?
        .parse()?;
    let usecase = TransitionApplicationUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&id, status).await?))
}

// ── DELETE /library-card-applications/{id} ───────────────────────────────────

pub async fn delete_application<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, LibraryServiceError> {
    require_admin(&state.store, &principal).await?;
    DeleteApplicationUseCase { repo: state.repo() }
        .execute(&id)
        .await?;
    Ok(success())
}
