use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use reunite_db::models::{FoundItemRow, LostItemRow, NewFoundItem, NewLostItem, NewReward};
use reunite_match::{ItemProfile, matches_for_found, matches_for_lost, parse_item_date};
use reunite_types::api::{
    Claims, FoundItemResponse, LostItemResponse, MatchResponse, ReportFoundItemRequest,
    ReportLostItemRequest,
};
use reunite_types::domain::{POINTS_REPORT_FOUND, POINTS_REPORT_LOST};

use crate::auth::{self, AppState};
use crate::error::{ApiError, ApiResult};

pub async fn report_lost_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReportLostItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    // Photo-derived details fill whatever the caller left blank; the
    // extractor itself never fails, it degrades to manual-entry defaults.
    let extracted = match decode_photo(req.photo_base64.as_deref())? {
        Some(bytes) => Some(state.ai.extract_details(&bytes).await),
        None => None,
    };
    let details = extracted.as_ref();

    let title = pick(req.title, details.map(|d| d.description.as_str()), "Untitled Item");
    let description = pick(req.description, details.map(|d| d.description.as_str()), "");
    let category = pick(req.category, details.map(|d| d.category.as_str()), "other");
    let color = pick(req.color, details.map(|d| d.color.as_str()), "");
    let brand = pick(req.brand, details.map(|d| d.brand.as_str()), "");
    let location = req.location.unwrap_or_default();
    let lost_date = resolve_date(req.lost_date.as_deref(), "lost_date")?;

    let item_id = Uuid::new_v4().to_string();
    let reward_id = Uuid::new_v4().to_string();
    state.db.insert_lost_item_with_reward(
        &NewLostItem {
            id: &item_id,
            user_id: &user.id,
            school_id: &school_id,
            title: &title,
            description: &description,
            category: &category,
            color: &color,
            brand: &brand,
            location: location.trim(),
            lost_date: Some(&lost_date),
            photo_url: req.photo_url.as_deref(),
            verification_question: req.verification_question.as_deref(),
            verification_answer: req.verification_answer.as_deref(),
        },
        &NewReward {
            id: &reward_id,
            user_id: &user.id,
            school_id: &school_id,
            points: POINTS_REPORT_LOST,
            reason: "Reported lost item",
            related_item_id: Some(&item_id),
            related_type: Some("lost"),
        },
    )?;

    // Best-effort sweep; the report and its reward are already durable.
    match sweep_lost_matches(state.clone(), item_id.clone()).await {
        Ok(created) if created > 0 => {
            info!("Created {} matches for lost item {}", created, item_id);
        }
        Ok(_) => debug!("No candidates met the threshold for lost item {}", item_id),
        Err(err) => warn!("Matching failed for lost item {}: {}", item_id, err),
    }

    let item = state
        .db
        .get_lost_item(&item_id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("item vanished after insert")))?;
    Ok((StatusCode::CREATED, Json(lost_item_response(item))))
}

pub async fn report_found_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReportFoundItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    let extracted = match decode_photo(req.photo_base64.as_deref())? {
        Some(bytes) => Some(state.ai.extract_details(&bytes).await),
        None => None,
    };
    let details = extracted.as_ref();

    let title = pick(req.title, details.map(|d| d.description.as_str()), "Untitled Item");
    let description = pick(req.description, details.map(|d| d.description.as_str()), "");
    let category = pick(req.category, details.map(|d| d.category.as_str()), "other");
    let color = pick(req.color, details.map(|d| d.color.as_str()), "");
    let brand = pick(req.brand, details.map(|d| d.brand.as_str()), "");
    let location = req.location.unwrap_or_default();
    let found_date = resolve_date(req.found_date.as_deref(), "found_date")?;

    let item_id = Uuid::new_v4().to_string();
    let reward_id = Uuid::new_v4().to_string();
    state.db.insert_found_item_with_reward(
        &NewFoundItem {
            id: &item_id,
            user_id: &user.id,
            school_id: &school_id,
            title: &title,
            description: &description,
            category: &category,
            color: &color,
            brand: &brand,
            location: location.trim(),
            found_date: Some(&found_date),
            photo_url: req.photo_url.as_deref(),
        },
        &NewReward {
            id: &reward_id,
            user_id: &user.id,
            school_id: &school_id,
            points: POINTS_REPORT_FOUND,
            reason: "Reported found item",
            related_item_id: Some(&item_id),
            related_type: Some("found"),
        },
    )?;

    match sweep_found_matches(state.clone(), item_id.clone()).await {
        Ok(created) if created > 0 => {
            info!("Created {} matches for found item {}", created, item_id);
        }
        Ok(_) => debug!("No candidates met the threshold for found item {}", item_id),
        Err(err) => warn!("Matching failed for found item {}: {}", item_id, err),
    }

    let item = state
        .db
        .get_found_item(&item_id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("item vanished after insert")))?;
    Ok((StatusCode::CREATED, Json(found_item_response(item))))
}

pub async fn list_lost_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    let items: Vec<LostItemResponse> = state
        .db
        .list_lost_items_by_school(&school_id)?
        .into_iter()
        .map(lost_item_response)
        .collect();
    Ok(Json(items))
}

pub async fn list_found_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    let items: Vec<FoundItemResponse> = state
        .db
        .list_found_items_by_school(&school_id)?
        .into_iter()
        .map(found_item_response)
        .collect();
    Ok(Json(items))
}

pub async fn delete_lost_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let item = state
        .db
        .get_lost_item(&item_id)?
        .ok_or_else(|| ApiError::NotFound("Lost item not found".into()))?;
    if item.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only delete your own lost items".into(),
        ));
    }

    state.db.delete_lost_item(&item_id)?;
    Ok(Json(serde_json::json!({ "message": "Lost item deleted successfully" })))
}

pub async fn delete_found_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let item = state
        .db
        .get_found_item(&item_id)?
        .ok_or_else(|| ApiError::NotFound("Found item not found".into()))?;
    if item.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only delete your own found items".into(),
        ));
    }

    state.db.delete_found_item(&item_id)?;
    Ok(Json(serde_json::json!({ "message": "Found item deleted successfully" })))
}

/// Open matches on the caller's lost items, highest confidence first.
pub async fn get_matches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    auth::require_school(&user)?;

    let matches: Vec<MatchResponse> = state
        .db
        .matches_for_owner(&user.id)?
        .into_iter()
        .map(|(m, lost, found)| MatchResponse {
            id: m.id,
            lost_item_id: m.lost_item_id,
            found_item_id: m.found_item_id,
            confidence_score: m.confidence_score,
            match_reasons: serde_json::from_str(&m.match_reasons).unwrap_or_default(),
            status: m.status,
            created_at: m.created_at,
            lost_item: lost_item_response(lost),
            found_item: found_item_response(found),
        })
        .collect();
    Ok(Json(matches))
}

// -- Matching sweeps --
// These run after the report transaction committed and must never fail
// the request; callers log the Err and move on.

async fn sweep_lost_matches(state: AppState, lost_item_id: String) -> anyhow::Result<usize> {
    tokio::task::spawn_blocking(move || {
        let Some(lost) = state.db.get_lost_item(&lost_item_id)? else {
            return Ok(0);
        };
        let pool = state.db.available_found_items(&lost.school_id)?;
        if pool.is_empty() {
            return Ok(0);
        }

        let profiles: Vec<ItemProfile<'_>> = pool.iter().map(found_profile).collect();
        let candidates = matches_for_lost(&lost_profile(&lost), &profiles);

        let mut created = 0;
        for candidate in &candidates {
            let found = &pool[candidate.index];
            let reasons = serde_json::to_string(&candidate.reasons)?;
            state.db.upsert_match(
                &Uuid::new_v4().to_string(),
                &lost.id,
                &found.id,
                f64::from(candidate.score),
                &reasons,
            )?;
            created += 1;
        }
        Ok(created)
    })
    .await
    .map_err(|e| anyhow::anyhow!("matching sweep join error: {}", e))?
}

async fn sweep_found_matches(state: AppState, found_item_id: String) -> anyhow::Result<usize> {
    tokio::task::spawn_blocking(move || {
        let Some(found) = state.db.get_found_item(&found_item_id)? else {
            return Ok(0);
        };
        let pool = state.db.active_lost_items(&found.school_id)?;
        if pool.is_empty() {
            return Ok(0);
        }

        let profiles: Vec<ItemProfile<'_>> = pool.iter().map(lost_profile).collect();
        let candidates = matches_for_found(&found_profile(&found), &profiles);

        let mut created = 0;
        for candidate in &candidates {
            let lost = &pool[candidate.index];
            let reasons = serde_json::to_string(&candidate.reasons)?;
            state.db.upsert_match(
                &Uuid::new_v4().to_string(),
                &lost.id,
                &found.id,
                f64::from(candidate.score),
                &reasons,
            )?;
            created += 1;
        }
        Ok(created)
    })
    .await
    .map_err(|e| anyhow::anyhow!("matching sweep join error: {}", e))?
}

fn lost_profile(item: &LostItemRow) -> ItemProfile<'_> {
    ItemProfile {
        title: &item.title,
        description: &item.description,
        category: &item.category,
        color: &item.color,
        brand: &item.brand,
        date: item.lost_date.as_deref().and_then(parse_item_date),
    }
}

fn found_profile(item: &FoundItemRow) -> ItemProfile<'_> {
    ItemProfile {
        title: &item.title,
        description: &item.description,
        category: &item.category,
        color: &item.color,
        brand: &item.brand,
        date: item.found_date.as_deref().and_then(parse_item_date),
    }
}

// -- Shared helpers --

/// First non-empty of: caller-supplied value, photo-extracted value,
/// fixed default.
fn pick(primary: Option<String>, extracted: Option<&str>, default: &str) -> String {
    if let Some(value) = primary {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    if let Some(value) = extracted {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    default.to_string()
}

/// Normalize a caller-supplied date to RFC 3339, or default to now.
/// Malformed input is a validation error at report time; stored dates
/// are therefore always parseable for scoring.
fn resolve_date(raw: Option<&str>, field: &str) -> ApiResult<String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let parsed = parse_item_date(raw)
                .ok_or_else(|| ApiError::Validation(format!("Invalid {field}")))?;
            Ok(parsed.to_rfc3339())
        }
        None => Ok(Utc::now().to_rfc3339()),
    }
}

pub(crate) fn decode_photo(photo_base64: Option<&str>) -> ApiResult<Option<Vec<u8>>> {
    match photo_base64.map(str::trim).filter(|s| !s.is_empty()) {
        Some(b64) => {
            let bytes = B64
                .decode(b64)
                .map_err(|_| ApiError::Validation("Invalid photo encoding".into()))?;
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}

pub(crate) fn lost_item_response(item: LostItemRow) -> LostItemResponse {
    LostItemResponse {
        id: item.id,
        user_id: item.user_id,
        school_id: item.school_id,
        title: item.title,
        description: item.description,
        category: item.category,
        color: item.color,
        brand: item.brand,
        location: item.location,
        lost_date: item.lost_date,
        photo_url: item.photo_url,
        status: item.status,
        created_at: item.created_at,
        user_name: item.user_name,
    }
}

pub(crate) fn found_item_response(item: FoundItemRow) -> FoundItemResponse {
    FoundItemResponse {
        id: item.id,
        user_id: item.user_id,
        school_id: item.school_id,
        title: item.title,
        description: item.description,
        category: item.category,
        color: item.color,
        brand: item.brand,
        location: item.location,
        found_date: item.found_date,
        photo_url: item.photo_url,
        status: item.status,
        created_at: item.created_at,
        finder_name: item.user_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_prefers_caller_then_extraction_then_default() {
        assert_eq!(pick(Some("Wallet".into()), Some("brown wallet"), "other"), "Wallet");
        assert_eq!(pick(Some("  ".into()), Some("brown wallet"), "other"), "brown wallet");
        assert_eq!(pick(None, None, "other"), "other");
    }

    #[test]
    fn resolve_date_rejects_garbage_and_defaults_to_now() {
        assert!(resolve_date(Some("not a date"), "lost_date").is_err());
        assert!(resolve_date(Some("2026-03-01"), "lost_date").is_ok());
        assert!(resolve_date(None, "lost_date").is_ok());
    }

    #[test]
    fn decode_photo_validates_base64() {
        assert!(decode_photo(Some("!!!not base64!!!")).is_err());
        assert_eq!(decode_photo(None).unwrap(), None);
        assert_eq!(decode_photo(Some("aGVsbG8=")).unwrap().as_deref(), Some(&b"hello"[..]));
    }
}
