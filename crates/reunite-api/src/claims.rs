use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use reunite_db::models::{ClaimRow, FoundItemRow, LostItemRow, NewReward};
use reunite_types::api::{Claims, ClaimResponse, CreateClaimRequest, VerifyClaimRequest};
use reunite_types::domain::{ClaimStatus, FoundItemStatus, POINTS_RETURNED_ITEM, Role, VerificationStatus};

use crate::auth::{self, AppState};
use crate::error::{ApiError, ApiResult};
use crate::items::{decode_photo, found_item_response, lost_item_response};

/// Confidence at or above which a proof photo auto-verifies. Below it the
/// claim stays pending for human review — never auto-rejected.
const PROOF_CONFIDENCE_THRESHOLD: f64 = 70.0;

pub async fn create_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateClaimRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let lost = state
        .db
        .get_lost_item(&req.lost_item_id)?
        .ok_or_else(|| ApiError::NotFound("Lost item not found".into()))?;
    let found = state
        .db
        .get_found_item(&req.found_item_id)?
        .ok_or_else(|| ApiError::NotFound("Found item not found".into()))?;

    if lost.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only claim items that match your own lost items".into(),
        ));
    }
    if found.status != FoundItemStatus::Available.as_str() {
        return Err(ApiError::Conflict("Item is no longer available".into()));
    }
    if state
        .db
        .find_claim(&lost.id, &found.id, &user.id)?
        .is_some()
    {
        return Err(ApiError::Conflict("You have already claimed this item".into()));
    }

    let claim_id = Uuid::new_v4().to_string();
    let created = state.db.insert_claim(
        &claim_id,
        &lost.id,
        &found.id,
        &user.id,
        req.verification_answer.as_deref().unwrap_or("").trim(),
    )?;
    if !created {
        // Lost the race to the schema constraint.
        return Err(ApiError::Conflict("You have already claimed this item".into()));
    }

    let claim = state
        .db
        .get_claim(&claim_id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("claim vanished after insert")))?;
    Ok((
        StatusCode::CREATED,
        Json(claim_response(claim, Some(lost), Some(found))),
    ))
}

/// Submit proof for a claim. With a photo, the photo intelligence
/// collaborator scores it; a failure there degrades to a neutral verdict
/// and the claim simply stays pending.
pub async fn verify_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VerifyClaimRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let claim = state
        .db
        .get_claim(&claim_id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    if claim.claimant_id != user.id {
        return Err(ApiError::Forbidden(
            "Only the claimant can submit verification".into(),
        ));
    }

    let lost = state
        .db
        .get_lost_item(&claim.lost_item_id)?
        .ok_or_else(|| ApiError::NotFound("Lost item not found".into()))?;

    let mut verification = None;
    let mut verification_status = claim.verification_status.clone();
    if let Some(bytes) = decode_photo(req.proof_photo_base64.as_deref())? {
        let verdict = state
            .ai
            .verify_proof(&bytes, &lost.description, lost.verification_question.as_deref())
            .await;
        verification_status = if verdict.verification_confidence >= PROOF_CONFIDENCE_THRESHOLD {
            VerificationStatus::Verified.as_str().to_string()
        } else {
            VerificationStatus::Pending.as_str().to_string()
        };
        verification = Some(verdict);
    }

    state
        .db
        .set_claim_proof(&claim.id, req.proof_photo_url.as_deref(), &verification_status)?;

    let updated = state
        .db
        .get_claim(&claim.id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    Ok(Json(serde_json::json!({
        "message": "Claim verification submitted",
        "claim": claim_response(updated, None, None),
        "verification": verification,
    })))
}

/// Approve a claim — finder or admin only. The database guard makes this
/// a one-way transition: a second approval is a conflict and can never
/// grant a second reward.
pub async fn approve_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let claim = state
        .db
        .get_claim(&claim_id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    let found = state
        .db
        .get_found_item(&claim.found_item_id)?
        .ok_or_else(|| ApiError::NotFound("Found item not found".into()))?;
    let lost = state
        .db
        .get_lost_item(&claim.lost_item_id)?
        .ok_or_else(|| ApiError::NotFound("Lost item not found".into()))?;

    let is_finder = found.user_id == user.id;
    let is_admin = user.role == Role::Admin.as_str();
    if !(is_finder || is_admin) {
        return Err(ApiError::Forbidden(
            "Only the finder or an admin can approve claims".into(),
        ));
    }
    if claim.status == ClaimStatus::Approved.as_str() {
        return Err(ApiError::Conflict("Claim is already approved".into()));
    }

    let reward_id = Uuid::new_v4().to_string();
    let approved = state.db.approve_claim(
        &claim.id,
        &lost.id,
        &found.id,
        is_admin.then_some(user.id.as_str()),
        &NewReward {
            id: &reward_id,
            user_id: &found.user_id,
            school_id: &found.school_id,
            points: POINTS_RETURNED_ITEM,
            reason: "Returned lost item",
            related_item_id: Some(&found.id),
            related_type: Some("found"),
        },
    )?;
    if !approved {
        return Err(ApiError::Conflict("Claim is already approved".into()));
    }

    let updated = state
        .db
        .get_claim(&claim.id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    let lost = state.db.get_lost_item(&lost.id)?;
    let found = state.db.get_found_item(&found.id)?;
    Ok(Json(serde_json::json!({
        "message": "Claim approved successfully",
        "claim": claim_response(updated, lost, found),
    })))
}

/// Terminal rejection; no reward, no item-status mutation.
pub async fn reject_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let claim = state
        .db
        .get_claim(&claim_id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    let found = state
        .db
        .get_found_item(&claim.found_item_id)?
        .ok_or_else(|| ApiError::NotFound("Found item not found".into()))?;

    let is_finder = found.user_id == user.id;
    let is_admin = user.role == Role::Admin.as_str();
    if !(is_finder || is_admin) {
        return Err(ApiError::Forbidden(
            "Only the finder or an admin can reject claims".into(),
        ));
    }

    if !state.db.reject_claim(&claim.id)? {
        return Err(ApiError::Conflict("Claim is already resolved".into()));
    }

    let updated = state
        .db
        .get_claim(&claim.id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    Ok(Json(serde_json::json!({
        "message": "Claim rejected",
        "claim": claim_response(updated, None, None),
    })))
}

/// Claims the caller has filed.
pub async fn my_claims(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let list: Vec<ClaimResponse> = state
        .db
        .claims_by_claimant(&user.id)?
        .into_iter()
        .map(|(claim, lost, found)| claim_response(claim, Some(lost), Some(found)))
        .collect();
    Ok(Json(list))
}

/// Claims filed against items the caller found.
pub async fn incoming_claims(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let list: Vec<ClaimResponse> = state
        .db
        .claims_for_finder(&user.id)?
        .into_iter()
        .map(|(claim, lost, found)| claim_response(claim, Some(lost), Some(found)))
        .collect();
    Ok(Json(list))
}

pub(crate) fn claim_response(
    claim: ClaimRow,
    lost: Option<LostItemRow>,
    found: Option<FoundItemRow>,
) -> ClaimResponse {
    ClaimResponse {
        id: claim.id,
        lost_item_id: claim.lost_item_id,
        found_item_id: claim.found_item_id,
        claimant_id: claim.claimant_id,
        verification_answer: claim.verification_answer,
        proof_photo_url: claim.proof_photo_url,
        verification_status: claim.verification_status,
        status: claim.status,
        verified_at: claim.verified_at,
        created_at: claim.created_at,
        claimant_name: claim.claimant_name,
        lost_item: lost.map(lost_item_response),
        found_item: found.map(found_item_response),
    }
}
