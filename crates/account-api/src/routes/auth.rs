//! Authentication extractor and account routes

use account_auth::{AuthUser, CredentialRecord, Outcome, session_token};
use account_db::NewUser;
use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::request::Parts,
    routing::post,
};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use super::validation::{required, validate_email, validate_name, validate_password};

// ==================== Auth Extractor ====================

/// Extractor for an authenticated caller
///
/// Any token problem, including no token at all, rejects with the same
/// `invalid jwt` error.
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = session_token(&parts.headers).unwrap_or_default();
        match app_state.validator.validate(token) {
            Outcome::Valid(claims) => {
                let user = AuthUser::from_claims(&claims);
                debug!("Authenticated user: {} ({})", user.id, user.email);
                Ok(RequireAuth(user))
            }
            Outcome::Invalid => Err(ApiError::InvalidToken),
        }
    }
}

// ==================== Account Routes ====================

/// Record checked when the login email is unknown, so that every login
/// attempt costs one key derivation. No password derives to it.
const DUMMY_RECORD: &str = "00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000.0000000000000000";

/// Run the key derivation on the blocking pool
async fn derive_record(password: String) -> Result<CredentialRecord, ApiError> {
    Ok(tokio::task::spawn_blocking(move || account_auth::derive(&password)).await??)
}

async fn verify_record(record: String, password: String) -> Result<bool, ApiError> {
    Ok(tokio::task::spawn_blocking(move || {
        account_auth::verify(&CredentialRecord::from_stored(record), &password)
    })
    .await?)
}

/// POST /user/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;

    let name = required(request.name)?;
    let email = required(request.email)?;
    let password = required(request.password)?;

    validate_name("name", &name)?;
    validate_email(&email)?;
    validate_password(&password)?;

    debug!("Registering user: {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest("user already exists".to_string()));
    }

    let record = derive_record(password).await?;

    let user = state
        .db
        .insert_user(NewUser {
            name,
            email,
            password: record.into_string(),
        })
        .await?;

    metrics::counter!("account_registrations_total").increment(1);
    info!("Registered user {} ({})", user.id, user.email);

    Ok(Json(UserResponse::from(user)))
}

/// POST /user/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let email = required(request.email)?;
    let password = required(request.password)?;
    validate_email(&email)?;
    validate_password(&password)?;

    debug!("Login attempt for user: {}", email);

    let user = state.db.get_user_by_email(&email).await?;
    let record = user
        .as_ref()
        .map(|u| u.password.clone())
        .unwrap_or_else(|| DUMMY_RECORD.to_string());

    let password_valid = verify_record(record, password).await?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("account_logins_total", "result" => "rejected").increment(1);
            warn!("Rejected login for {}", email);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let jwt = state.signer.issue(user.id, &user.email)?;

    metrics::counter!("account_logins_total", "result" => "accepted").increment(1);
    info!("User {} logged in successfully", user.id);

    Ok(Json(LoginResponse {
        jwt,
        expires_in: state.signer.ttl_secs(),
    }))
}

/// Create account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
}
