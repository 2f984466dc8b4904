use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use reunite_ai::AiClient;
use reunite_db::Database;
use reunite_db::models::UserRow;
use reunite_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserResponse};

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub ai: AiClient,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();
    let email_ok = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !email_ok {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(ApiError::Validation("First and last name are required".into()));
    }

    if state.db.get_user_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    // An invalid join code fails the whole registration rather than
    // silently creating a schoolless account.
    let join_code = req
        .join_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase);
    let school_id = match join_code {
        Some(code) => {
            let school = state
                .db
                .get_school_by_join_code(&code)?
                .ok_or_else(|| ApiError::Validation("Invalid join code".into()))?;
            Some(school.id)
        }
        None => None,
    };

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    state.db.create_user(
        &user_id.to_string(),
        &email,
        &password_hash,
        first_name,
        last_name,
        "student",
        school_id.as_deref(),
    )?;

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished after insert")))?;
    let token = create_token(&state.jwt_secret, user_id, &email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_response(&user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .db
        .get_user_by_email(&email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt password hash: {}", e)))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("Invalid email or password".into()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id: {}", e)))?;
    let token = create_token(&state.jwt_secret, user_id, &user.email)?;

    Ok(Json(AuthResponse {
        user: user_response(&user),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = current_user(&state, &claims)?;
    Ok(Json(serde_json::json!({ "user": user_response(&user) })))
}

/// Resolve the authenticated user row; the token only proves identity,
/// role and school membership are always read fresh.
pub fn current_user(state: &AppStateInner, claims: &Claims) -> ApiResult<UserRow> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }
    Ok(user)
}

/// Items, claims, and rewards are all scoped to a school.
pub fn require_school(user: &UserRow) -> ApiResult<String> {
    user.school_id
        .clone()
        .ok_or_else(|| ApiError::Validation("You must be in a school".into()))
}

pub fn user_response(user: &UserRow) -> UserResponse {
    UserResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role.clone(),
        school_id: user.school_id.clone(),
        created_at: user.created_at.clone(),
    }
}

/// Hash a password with Argon2id. Also used by the server binary to seed
/// the default admin account.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse battery", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong password", &parsed)
                .is_err()
        );
    }
}
