/// Database row types — these map directly to SQLite rows.
/// Distinct from the reunite-types API models to keep the DB layer
/// independent. `*_name` fields are display names filled by JOINed reads
/// and left `None` by lookups that don't join users.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub school_id: Option<String>,
    pub created_at: String,
}

pub struct SchoolRow {
    pub id: String,
    pub name: String,
    pub join_code: String,
    pub created_by: String,
    pub is_active: bool,
    pub created_at: String,
}

pub struct LostItemRow {
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
    pub verification_question: Option<String>,
    pub verification_answer: Option<String>,
    pub status: String,
    pub created_at: String,
    pub user_name: Option<String>,
}

pub struct FoundItemRow {
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
    pub user_name: Option<String>,
}

pub struct MatchRow {
    pub id: String,
    pub lost_item_id: String,
    pub found_item_id: String,
    pub confidence_score: f64,
    /// JSON array of reason strings, stored as text.
    pub match_reasons: String,
    pub status: String,
    pub created_at: String,
}

pub struct ClaimRow {
    pub id: String,
    pub lost_item_id: String,
    pub found_item_id: String,
    pub claimant_id: String,
    pub verification_answer: String,
    pub proof_photo_url: Option<String>,
    pub verification_status: String,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub status: String,
    pub created_at: String,
    pub claimant_name: Option<String>,
}

pub struct MessageRow {
    pub id: String,
    pub claim_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
    pub sender_name: String,
}

pub struct RewardRow {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub points: i64,
    pub reason: String,
    pub related_item_id: Option<String>,
    pub related_type: Option<String>,
    pub created_at: String,
}

pub struct LeaderboardRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub total_points: i64,
}

// -- Insert parameter bundles --

pub struct NewLostItem<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub school_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub color: &'a str,
    pub brand: &'a str,
    pub location: &'a str,
    pub lost_date: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub verification_question: Option<&'a str>,
    pub verification_answer: Option<&'a str>,
}

pub struct NewFoundItem<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub school_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub color: &'a str,
    pub brand: &'a str,
    pub location: &'a str,
    pub found_date: Option<&'a str>,
    pub photo_url: Option<&'a str>,
}

pub struct NewReward<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub school_id: &'a str,
    pub points: i64,
    pub reason: &'a str,
    pub related_item_id: Option<&'a str>,
    pub related_type: Option<&'a str>,
}
