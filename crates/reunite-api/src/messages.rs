use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use reunite_db::models::MessageRow;
use reunite_types::api::{Claims, MessageResponse, SendMessageRequest};

use crate::auth::{self, AppState};
use crate::error::{ApiError, ApiResult};

/// Send a message in a claim's negotiation thread. The receiver is always
/// the opposite party; anyone else is turned away.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Message content is required".into()));
    }

    let claim = state
        .db
        .get_claim(&req.claim_id)?
        .ok_or_else(|| ApiError::NotFound("Claim not found".into()))?;
    let found = state
        .db
        .get_found_item(&claim.found_item_id)?
        .ok_or_else(|| ApiError::NotFound("Found item not found".into()))?;

    let receiver_id = if user.id == claim.claimant_id {
        found.user_id.clone()
    } else if user.id == found.user_id {
        claim.claimant_id.clone()
    } else {
        return Err(ApiError::Forbidden(
            "Only the claimant or the finder can exchange messages".into(),
        ));
    };

    let message_id = Uuid::new_v4().to_string();
    state
        .db
        .insert_message(&message_id, &claim.id, &user.id, &receiver_id, content)?;

    let sent = state
        .db
        .messages_for_claim(&claim.id)?
        .into_iter()
        .find(|m| m.id == message_id)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("message vanished after insert")))?;
    Ok((StatusCode::CREATED, Json(message_response(sent))))
}

/// Full thread for a claim, oldest first. Reading marks the caller's
/// received messages as read.
pub async fn get_messages(
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

    if user.id != claim.claimant_id && user.id != found.user_id {
        return Err(ApiError::Forbidden(
            "Only the claimant or the finder can read this thread".into(),
        ));
    }

    state.db.mark_messages_read(&claim.id, &user.id)?;

    let thread: Vec<MessageResponse> = state
        .db
        .messages_for_claim(&claim.id)?
        .into_iter()
        .map(message_response)
        .collect();
    Ok(Json(thread))
}

fn message_response(message: MessageRow) -> MessageResponse {
    MessageResponse {
        id: message.id,
        claim_id: message.claim_id,
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        content: message.content,
        is_read: message.is_read,
        created_at: message.created_at,
        sender_name: message.sender_name,
    }
}
