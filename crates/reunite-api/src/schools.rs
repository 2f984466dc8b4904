use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use uuid::Uuid;

use reunite_db::models::SchoolRow;
use reunite_types::api::{Claims, CreateSchoolRequest, JoinSchoolRequest, SchoolResponse};
use reunite_types::domain::Role;

use crate::auth::{self, AppState, AppStateInner};
use crate::error::{ApiError, ApiResult};

const JOIN_CODE_LEN: usize = 6;
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// -- Admin school management --

pub async fn create_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSchoolRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = require_admin(&state, &claims)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("School name is required".into()));
    }

    let school_id = Uuid::new_v4().to_string();
    let join_code = unique_join_code(&state)?;
    state.db.create_school(&school_id, name, &join_code, &admin.id)?;

    let school = state
        .db
        .get_school(&school_id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("school vanished after insert")))?;
    let response = school_response(&state, school)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_schools(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, &claims)?;

    let schools = state
        .db
        .list_active_schools()?
        .into_iter()
        .map(|school| school_response(&state, school))
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(schools))
}

pub async fn get_school(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, &claims)?;

    let school = state
        .db
        .get_school(&school_id)?
        .ok_or_else(|| ApiError::NotFound("School not found".into()))?;
    let response = school_response(&state, school)?;
    Ok(Json(response))
}

/// Soft delete: members keep their history, the join code stops working.
pub async fn deactivate_school(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, &claims)?;

    if !state.db.deactivate_school(&school_id)? {
        return Err(ApiError::NotFound("School not found".into()));
    }
    Ok(Json(serde_json::json!({ "message": "School deactivated successfully" })))
}

pub async fn regenerate_join_code(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, &claims)?;

    let join_code = unique_join_code(&state)?;
    if !state.db.set_join_code(&school_id, &join_code)? {
        return Err(ApiError::NotFound("School not found".into()));
    }
    Ok(Json(serde_json::json!({
        "message": "Join code regenerated",
        "join_code": join_code,
    })))
}

// -- Student membership --

pub async fn join_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<JoinSchoolRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let join_code = req.join_code.trim().to_uppercase();
    if join_code.is_empty() {
        return Err(ApiError::Validation("Join code is required".into()));
    }

    let school = state
        .db
        .get_school_by_join_code(&join_code)?
        .ok_or_else(|| ApiError::NotFound("Invalid join code".into()))?;

    if let Some(current) = &user.school_id {
        if *current == school.id {
            return Err(ApiError::Conflict(
                "You are already a member of this school".into(),
            ));
        }
        return Err(ApiError::Conflict(
            "You are already a member of another school".into(),
        ));
    }

    state.db.set_user_school(&user.id, Some(&school.id))?;

    let response = school_response(&state, school)?;
    Ok(Json(serde_json::json!({
        "message": "Successfully joined school",
        "school": response,
    })))
}

pub async fn my_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let Some(school_id) = user.school_id else {
        return Ok(Json(serde_json::json!({ "school": null })));
    };

    let school = state
        .db
        .get_school(&school_id)?
        .ok_or_else(|| ApiError::NotFound("School not found".into()))?;
    let response = school_response(&state, school)?;
    Ok(Json(serde_json::json!({ "school": response })))
}

pub async fn leave_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    if user.school_id.is_none() {
        return Err(ApiError::Validation(
            "You are not a member of any school".into(),
        ));
    }

    state.db.set_user_school(&user.id, None)?;
    Ok(Json(serde_json::json!({ "message": "Successfully left school" })))
}

// -- Helpers --

fn require_admin(state: &AppStateInner, claims: &Claims) -> ApiResult<reunite_db::models::UserRow> {
    let user = auth::current_user(state, claims)?;
    if user.role != Role::Admin.as_str() {
        return Err(ApiError::Forbidden("Admin access required".into()));
    }
    Ok(user)
}

/// Short uppercase code, retried until unused. Codes of deactivated
/// schools stay reserved.
fn unique_join_code(state: &AppStateInner) -> ApiResult<String> {
    loop {
        let code = generate_join_code();
        if !state.db.join_code_exists(&code)? {
            return Ok(code);
        }
    }
}

fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..JOIN_CODE_ALPHABET.len());
            JOIN_CODE_ALPHABET[idx] as char
        })
        .collect()
}

fn school_response(state: &AppStateInner, school: SchoolRow) -> ApiResult<SchoolResponse> {
    let member_count = state.db.school_member_count(&school.id)?;
    Ok(SchoolResponse {
        id: school.id,
        name: school.name,
        join_code: school.join_code,
        created_by: school.created_by,
        created_at: school.created_at,
        member_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_codes_are_six_chars_from_the_alphabet() {
        for _ in 0..50 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LEN);
            assert!(code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)));
        }
    }
}
