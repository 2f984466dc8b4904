use axum::{Extension, Json, extract::State, response::IntoResponse};

use reunite_types::api::{Claims, LeaderboardEntry, PointsResponse, RewardResponse};

use crate::auth::{self, AppState};
use crate::error::ApiResult;

const HISTORY_LIMIT: u32 = 20;
const LEADERBOARD_LIMIT: u32 = 10;

/// Total points plus recent grant history for the caller, scoped to
/// their school.
pub async fn my_points(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    let total_points = state.db.total_points(&user.id, &school_id)?;
    let rewards = state
        .db
        .recent_rewards(&user.id, &school_id, HISTORY_LIMIT)?
        .into_iter()
        .map(|r| RewardResponse {
            id: r.id,
            points: r.points,
            reason: r.reason,
            related_item_id: r.related_item_id,
            related_type: r.related_type,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(PointsResponse {
        total_points,
        rewards,
    }))
}

/// Top point totals in the caller's school, ranked 1..N.
pub async fn leaderboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::current_user(&state, &claims)?;
    let school_id = auth::require_school(&user)?;

    let entries: Vec<LeaderboardEntry> = state
        .db
        .leaderboard(&school_id, LEADERBOARD_LIMIT)?
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i as u32 + 1,
            user_id: row.user_id,
            name: format!("{} {}", row.first_name, row.last_name),
            points: row.total_points,
        })
        .collect();

    Ok(Json(entries))
}
