use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use agora_core::{JwtAuth, Messaging, MessagingError};
use agora_types::api::{AuthResponse, LoginRequest, RegisterRequest};
use agora_types::unix_now;

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub messaging: Messaging,
    pub jwt: Arc<JwtAuth>,
}

const MIN_PASSWORD_CHARS: usize = 6;
const MAX_NAME_CHARS: usize = 50;

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

fn check_name(name: &str, which: &str) -> ApiResult<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(ApiError::invalid(format!(
            "{which} name must be between 1 and {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if !looks_like_email(&req.email) {
        return Err(ApiError::invalid("invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::invalid("password is shorter than 6 characters"));
    }
    check_name(&req.name_first, "first")?;
    check_name(&req.name_last, "last")?;

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?
        .to_string();

    let (user_id, handle) = state.messaging.store().write(|ws| {
        if ws.user_by_email(&req.email).is_some() {
            return Err(MessagingError::InvalidArgument("email is already in use".into()));
        }
        let id = ws.create_user(
            &req.email,
            &password_hash,
            &req.name_first,
            &req.name_last,
            unix_now(),
        );
        let handle = ws.user(id).map(|u| u.handle.clone()).unwrap_or_default();
        Ok((id, handle))
    })?;

    let token = state
        .jwt
        .issue(user_id, &handle)
        .map_err(|e| ApiError::internal(format!("token issue failed: {e}")))?;

    info!("Registered user {} as {}", user_id, handle);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            auth_user_id: user_id,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user_id, handle, stored_hash) = state.messaging.store().read(|ws| {
        ws.user_by_email(&req.email)
            .map(|u| (u.id, u.handle.clone(), u.password_hash.clone()))
            .ok_or_else(|| MessagingError::InvalidArgument("email does not belong to a user".into()))
    })?;

    // Verify password
    let parsed_hash = PasswordHash::new(&stored_hash)
        .map_err(|e| ApiError::internal(format!("stored hash is corrupt: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::invalid("incorrect password"))?;

    let token = state
        .jwt
        .issue(user_id, &handle)
        .map_err(|e| ApiError::internal(format!("token issue failed: {e}")))?;

    Ok(Json(AuthResponse {
        auth_user_id: user_id,
        token,
    }))
}
