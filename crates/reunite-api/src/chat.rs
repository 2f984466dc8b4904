use axum::{Extension, Json, extract::State, response::IntoResponse};

use reunite_ai::ChatTurn;
use reunite_types::api::{ChatbotRequest, ChatbotResponse, Claims};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// Rolling context window: only the most recent turns are forwarded.
const HISTORY_WINDOW: usize = 10;

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant for Reunite, a lost and found platform.
You help users with:
- Finding lost items
- Reporting found items
- Understanding how to use the platform
- Answering questions about lost and found processes
- Providing tips for better item recovery

Be friendly, concise, and helpful. If you don't know something specific about the user's account, suggest they check their dashboard.";

/// Assistant endpoint. Stateless per call: the client carries the
/// conversation and sends it back each turn.
pub async fn send_chat_message(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<ChatbotRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".into()));
    }

    let mut turns: Vec<ChatTurn> = Vec::new();
    if req.history.is_empty() {
        // First message carries the platform context.
        turns.push(ChatTurn::user(format!(
            "{SYSTEM_PROMPT}\n\nNow, the user is asking: {message}"
        )));
    } else {
        let start = req.history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &req.history[start..] {
            if turn.role == "user" || turn.role == "assistant" {
                turns.push(ChatTurn {
                    role: turn.role.clone(),
                    content: turn.content.clone(),
                    images: None,
                });
            }
        }
        turns.push(ChatTurn::user(message));
    }

    let reply = state.ai.chat(&turns).await?;
    let response = if reply.is_empty() {
        "I'm sorry, I didn't get a response. Please try again.".to_string()
    } else {
        reply
    };

    Ok(Json(ChatbotResponse { response }))
}
