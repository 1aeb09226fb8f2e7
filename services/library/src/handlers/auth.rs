use anyhow::Context as _;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use gcmn_auth_types::{
    cookie::{clear_session_cookie, set_session_cookie},
    session::Session,
    token::{ADMIN_SUBJECT, Principal, issue_session_token},
};
use gcmn_domain::role::AppRole;

use crate::domain::repository::Storage;
use crate::domain::types::{Profile, ProfilePatch};
use crate::error::LibraryServiceError;
use crate::handlers::success;
use crate::state::AppState;
use crate::usecase::account::{
    GetProfileUseCase, LoginInput, LoginOutcome, LoginUseCase, Me, MeUseCase, RegisterInput,
    RegisterUseCase, UpdateProfileUseCase,
};

/// Where the admin dashboard lives in the web client.
const ADMIN_REDIRECT: &str = "/admin-dashboard";

fn start_session<S: Storage>(
    state: &AppState<S>,
    jar: CookieJar,
    principal: &Principal,
) -> Result<CookieJar, LibraryServiceError> {
    let token = issue_session_token(principal, state.session_key.as_str())
        .context("failed to sign session token")?;
    Ok(set_session_cookie(jar, token, state.cookie_domain.clone()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: UserSummary,
}

pub async fn register<S: Storage>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, LibraryServiceError> {
    let usecase = RegisterUseCase { repo: state.repo() };
    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            phone: body.phone,
            roll_number: body.roll_number,
            department: body.department,
            student_class: body.student_class,
        })
        .await?;

    let jar = start_session(
        &state,
        jar,
        &Principal::User {
            user_id: user.id.clone(),
        },
    )?;
    let body = RegisterResponse {
        user: UserSummary {
            id: user.id,
            email: user.email,
            name: None,
            card_number: None,
        },
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub secret_key: Option<String>,
    pub library_card_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserSummary,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

pub async fn login<S: Storage>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, LibraryServiceError> {
    let usecase = LoginUseCase {
        repo: state.repo(),
        admin: state.admin.clone(),
    };
    let outcome = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
            secret_key: body.secret_key,
            library_card_id: body.library_card_id,
        })
        .await?;

    let jar = start_session(&state, jar, &outcome.principal())?;
    let body = match outcome {
        LoginOutcome::Admin { email } => LoginResponse {
            user: UserSummary {
                id: ADMIN_SUBJECT.to_owned(),
                email,
                name: None,
                card_number: None,
            },
            is_admin: true,
            redirect: Some(ADMIN_REDIRECT),
        },
        LoginOutcome::Card(application) => LoginResponse {
            user: UserSummary {
                name: Some(application.full_name()),
                id: application.id,
                email: application.email,
                card_number: None,
            },
            is_admin: false,
            redirect: None,
        },
        LoginOutcome::User { user, is_admin } => LoginResponse {
            user: UserSummary {
                id: user.id,
                email: user.email,
                name: None,
                card_number: None,
            },
            is_admin,
            redirect: is_admin.then_some(ADMIN_REDIRECT),
        },
    };
    Ok((jar, Json(body)))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout<S: Storage>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> impl IntoResponse {
    (clear_session_cookie(jar, state.cookie_domain.clone()), success())
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(untagged)]
pub enum MeResponse {
    Admin {
        user: UserSummary,
        roles: Vec<AppRole>,
        #[serde(rename = "isAdmin")]
        is_admin: bool,
    },
    Card {
        user: UserSummary,
        #[serde(rename = "isLibraryCard")]
        is_library_card: bool,
    },
    User {
        user: UserSummary,
        profile: Option<Profile>,
        roles: Vec<AppRole>,
        #[serde(rename = "isAdmin")]
        is_admin: bool,
    },
}

pub async fn me<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<MeResponse>, LibraryServiceError> {
    let usecase = MeUseCase {
        repo: state.repo(),
        admin_email: state.admin.email.clone(),
    };
    let body = match usecase.execute(&principal).await? {
        Me::Admin { email } => MeResponse::Admin {
            user: UserSummary {
                id: ADMIN_SUBJECT.to_owned(),
                email,
                name: None,
                card_number: None,
            },
            roles: vec![AppRole::Admin],
            is_admin: true,
        },
        Me::Card(application) => MeResponse::Card {
            user: UserSummary {
                name: Some(application.full_name()),
                id: application.id,
                email: application.email,
                card_number: Some(application.card_number),
            },
            is_library_card: true,
        },
        Me::User {
            user,
            profile,
            roles,
        } => MeResponse::User {
            is_admin: roles.contains(&AppRole::Admin),
            user: UserSummary {
                id: user.id,
                email: user.email,
                name: None,
                card_number: None,
            },
            profile,
            roles,
        },
    };
    Ok(Json(body))
}

// ── GET /profile ─────────────────────────────────────────────────────────────

pub async fn get_profile<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
) -> Result<Json<Option<Profile>>, LibraryServiceError> {
    let Principal::User { user_id } = principal else {
        return Ok(Json(None));
    };
    let usecase = GetProfileUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&user_id).await?))
}

// ── PUT /profile ─────────────────────────────────────────────────────────────

pub async fn update_profile<S: Storage>(
    Session(principal): Session,
    State(state): State<AppState<S>>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>, LibraryServiceError> {
    let Principal::User { user_id } = principal else {
        return Err(LibraryServiceError::Forbidden);
    };
    let usecase = UpdateProfileUseCase { repo: state.repo() };
    Ok(Json(usecase.execute(&user_id, patch).await?))
}
