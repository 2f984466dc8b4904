use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared between the REST middleware and token issuance.
/// Canonical definition lives here in reunite-types so both sides agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub join_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub school_id: Option<String>,
    pub created_at: String,
}

// -- Items --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportLostItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub location: Option<String>,
    /// RFC 3339; defaults to now when absent.
    pub lost_date: Option<String>,
    /// Reference to an externally stored photo.
    pub photo_url: Option<String>,
    /// Raw photo bytes for detail extraction; never stored here.
    pub photo_base64: Option<String>,
    pub verification_question: Option<String>,
    pub verification_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportFoundItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub location: Option<String>,
    pub found_date: Option<String>,
    pub photo_url: Option<String>,
    pub photo_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LostItemResponse {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub color: String,
    pub brand: String,
    pub location: String,
    pub lost_date: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoundItemResponse {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub color: String,
    pub brand: String,
    pub location: String,
    pub found_date: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub finder_name: Option<String>,
}

// -- Matches --

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: String,
    pub lost_item_id: String,
    pub found_item_id: String,
    pub confidence_score: f64,
    pub match_reasons: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub lost_item: LostItemResponse,
    pub found_item: FoundItemResponse,
}

// -- Claims --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateClaimRequest {
    pub lost_item_id: String,
    pub found_item_id: String,
    pub verification_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyClaimRequest {
    pub proof_photo_base64: Option<String>,
    pub proof_photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: String,
    pub lost_item_id: String,
    pub found_item_id: String,
    pub claimant_id: String,
    pub verification_answer: String,
    pub proof_photo_url: Option<String>,
    pub verification_status: String,
    pub status: String,
    pub verified_at: Option<String>,
    pub created_at: String,
    pub claimant_name: Option<String>,
    pub lost_item: Option<LostItemResponse>,
    pub found_item: Option<FoundItemResponse>,
}

// -- Claim chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub claim_id: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub claim_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
    pub sender_name: String,
}

// -- Rewards --

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub id: String,
    pub points: i64,
    pub reason: String,
    pub related_item_id: Option<String>,
    pub related_type: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub total_points: i64,
    pub rewards: Vec<RewardResponse>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    pub points: i64,
}

// -- Schools --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSchoolRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinSchoolRequest {
    pub join_code: String,
}

#[derive(Debug, Serialize)]
pub struct SchoolResponse {
    pub id: String,
    pub name: String,
    pub join_code: String,
    pub created_by: String,
    pub created_at: String,
    pub member_count: i64,
}

// -- Assistant chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatbotRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatHistoryTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatHistoryTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub response: String,
}
