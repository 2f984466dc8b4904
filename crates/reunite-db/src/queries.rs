use crate::Database;
use crate::models::{
    ClaimRow, FoundItemRow, LeaderboardRow, LostItemRow, MatchRow, MessageRow, NewFoundItem,
    NewLostItem, NewReward, RewardRow, SchoolRow, UserRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

// Shared column lists so every read of an entity maps identically.
const LOST_COLS: &str = "l.id, l.user_id, l.school_id, l.title, l.description, l.category, \
     l.color, l.brand, l.location, l.lost_date, l.photo_url, l.verification_question, \
     l.verification_answer, l.status, l.created_at";
const LOST_WIDTH: usize = 15;

const FOUND_COLS: &str = "f.id, f.user_id, f.school_id, f.title, f.description, f.category, \
     f.color, f.brand, f.location, f.found_date, f.photo_url, f.status, f.created_at";
const FOUND_WIDTH: usize = 13;

const MATCH_COLS: &str =
    "m.id, m.lost_item_id, m.found_item_id, m.confidence_score, m.match_reasons, m.status, \
     m.created_at";
const MATCH_WIDTH: usize = 7;

const CLAIM_COLS: &str = "c.id, c.lost_item_id, c.found_item_id, c.claimant_id, \
     c.verification_answer, c.proof_photo_url, c.verification_status, c.verified_by, \
     c.verified_at, c.status, c.created_at";
const CLAIM_WIDTH: usize = 11;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        role: &str,
        school_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, first_name, last_name, role, school_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, email, password_hash, first_name, last_name, role, school_id],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.prepare(
                "SELECT id, email, password, first_name, last_name, role, is_active, school_id, \
                 created_at FROM users WHERE email = ?1",
            )?
            .query_row([email], map_user)
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.prepare(
                "SELECT id, email, password, first_name, last_name, role, is_active, school_id, \
                 created_at FROM users WHERE id = ?1",
            )?
            .query_row([id], map_user)
            .optional()
        })
    }

    pub fn set_user_school(&self, user_id: &str, school_id: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET school_id = ?2 WHERE id = ?1",
                params![user_id, school_id],
            )?;
            Ok(())
        })
    }

    // -- Schools --

    pub fn create_school(&self, id: &str, name: &str, join_code: &str, created_by: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO schools (id, name, join_code, created_by) VALUES (?1, ?2, ?3, ?4)",
                params![id, name, join_code, created_by],
            )?;
            Ok(())
        })
    }

    pub fn get_school(&self, id: &str) -> Result<Option<SchoolRow>> {
        self.with_conn(|conn| {
            conn.prepare(
                "SELECT id, name, join_code, created_by, is_active, created_at FROM schools \
                 WHERE id = ?1",
            )?
            .query_row([id], map_school)
            .optional()
        })
    }

    /// Active schools only — a deactivated school's code stops working.
    pub fn get_school_by_join_code(&self, join_code: &str) -> Result<Option<SchoolRow>> {
        self.with_conn(|conn| {
            conn.prepare(
                "SELECT id, name, join_code, created_by, is_active, created_at FROM schools \
                 WHERE join_code = ?1 AND is_active = 1",
            )?
            .query_row([join_code], map_school)
            .optional()
        })
    }

    /// Uniqueness check for code generation. Unlike the join lookup this
    /// sees deactivated schools too — their codes stay reserved.
    pub fn join_code_exists(&self, join_code: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM schools WHERE join_code = ?1",
                [join_code],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn list_active_schools(&self) -> Result<Vec<SchoolRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, join_code, created_by, is_active, created_at FROM schools \
                 WHERE is_active = 1 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([], map_school)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn deactivate_school(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute("UPDATE schools SET is_active = 0 WHERE id = ?1", [id])?;
            Ok(updated > 0)
        })
    }

    pub fn set_join_code(&self, id: &str, join_code: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE schools SET join_code = ?2 WHERE id = ?1",
                params![id, join_code],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn school_member_count(&self, id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE school_id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- Items --

    /// Report a lost item. The item row and its reporting reward commit
    /// in one transaction; matching runs separately, after commit.
    pub fn insert_lost_item_with_reward(
        &self,
        item: &NewLostItem,
        reward: &NewReward,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO lost_items (id, user_id, school_id, title, description, category, \
                 color, brand, location, lost_date, photo_url, verification_question, \
                 verification_answer) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    item.id,
                    item.user_id,
                    item.school_id,
                    item.title,
                    item.description,
                    item.category,
                    item.color,
                    item.brand,
                    item.location,
                    item.lost_date,
                    item.photo_url,
                    item.verification_question,
                    item.verification_answer,
                ],
            )?;
            insert_reward(&tx, reward)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn insert_found_item_with_reward(
        &self,
        item: &NewFoundItem,
        reward: &NewReward,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO found_items (id, user_id, school_id, title, description, category, \
                 color, brand, location, found_date, photo_url) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.id,
                    item.user_id,
                    item.school_id,
                    item.title,
                    item.description,
                    item.category,
                    item.color,
                    item.brand,
                    item.location,
                    item.found_date,
                    item.photo_url,
                ],
            )?;
            insert_reward(&tx, reward)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_lost_item(&self, id: &str) -> Result<Option<LostItemRow>> {
        self.with_conn(|conn| {
            conn.prepare(&format!(
                "SELECT {LOST_COLS} FROM lost_items l WHERE l.id = ?1"
            ))?
            .query_row([id], |row| map_lost_item(row, 0))
            .optional()
        })
    }

    pub fn get_found_item(&self, id: &str) -> Result<Option<FoundItemRow>> {
        self.with_conn(|conn| {
            conn.prepare(&format!(
                "SELECT {FOUND_COLS} FROM found_items f WHERE f.id = ?1"
            ))?
            .query_row([id], |row| map_found_item(row, 0))
            .optional()
        })
    }

    /// All lost items in a school, newest first, with reporter names
    /// joined in a single query.
    pub fn list_lost_items_by_school(&self, school_id: &str) -> Result<Vec<LostItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOST_COLS}, u.first_name || ' ' || u.last_name \
                 FROM lost_items l LEFT JOIN users u ON u.id = l.user_id \
                 WHERE l.school_id = ?1 ORDER BY l.created_at DESC"
            ))?;
            let rows = stmt
                .query_map([school_id], |row| {
                    let mut item = map_lost_item(row, 0)?;
                    item.user_name = row.get(LOST_WIDTH)?;
                    Ok(item)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_found_items_by_school(&self, school_id: &str) -> Result<Vec<FoundItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FOUND_COLS}, u.first_name || ' ' || u.last_name \
                 FROM found_items f LEFT JOIN users u ON u.id = f.user_id \
                 WHERE f.school_id = ?1 ORDER BY f.created_at DESC"
            ))?;
            let rows = stmt
                .query_map([school_id], |row| {
                    let mut item = map_found_item(row, 0)?;
                    item.user_name = row.get(FOUND_WIDTH)?;
                    Ok(item)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Open lost items — the candidate pool when a found item is reported.
    pub fn active_lost_items(&self, school_id: &str) -> Result<Vec<LostItemRow>> {
        self.lost_items_with_status(school_id, "active")
    }

    /// Open found items — the candidate pool when a lost item is reported.
    pub fn available_found_items(&self, school_id: &str) -> Result<Vec<FoundItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FOUND_COLS} FROM found_items f \
                 WHERE f.school_id = ?1 AND f.status = 'available' ORDER BY f.created_at"
            ))?;
            let rows = stmt
                .query_map([school_id], |row| map_found_item(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn lost_items_with_status(&self, school_id: &str, status: &str) -> Result<Vec<LostItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOST_COLS} FROM lost_items l \
                 WHERE l.school_id = ?1 AND l.status = ?2 ORDER BY l.created_at"
            ))?;
            let rows = stmt
                .query_map(params![school_id, status], |row| map_lost_item(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Owner-initiated delete; matches and claims go with it via cascade.
    pub fn delete_lost_item(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM lost_items WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn delete_found_item(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM found_items WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Matches --

    /// Persist one qualifying pairing. On a re-score of an existing pair
    /// the row keeps whichever confidence is higher; status is untouched.
    pub fn upsert_match(
        &self,
        id: &str,
        lost_item_id: &str,
        found_item_id: &str,
        confidence_score: f64,
        match_reasons: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO matches (id, lost_item_id, found_item_id, confidence_score, \
                 match_reasons) VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(lost_item_id, found_item_id) DO UPDATE SET \
                     confidence_score = excluded.confidence_score, \
                     match_reasons = excluded.match_reasons \
                 WHERE excluded.confidence_score > matches.confidence_score",
                params![id, lost_item_id, found_item_id, confidence_score, match_reasons],
            )?;
            Ok(())
        })
    }

    /// Open matches on the user's lost items, highest confidence first,
    /// with both items joined in one query.
    pub fn matches_for_owner(
        &self,
        user_id: &str,
    ) -> Result<Vec<(MatchRow, LostItemRow, FoundItemRow)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MATCH_COLS}, {LOST_COLS}, {FOUND_COLS} \
                 FROM matches m \
                 JOIN lost_items l ON l.id = m.lost_item_id \
                 JOIN found_items f ON f.id = m.found_item_id \
                 WHERE l.user_id = ?1 AND m.status IN ('pending', 'viewed') \
                 ORDER BY m.confidence_score DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok((
                        map_match(row, 0)?,
                        map_lost_item(row, MATCH_WIDTH)?,
                        map_found_item(row, MATCH_WIDTH + LOST_WIDTH)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Claims --

    pub fn get_claim(&self, id: &str) -> Result<Option<ClaimRow>> {
        self.with_conn(|conn| {
            conn.prepare(&format!("SELECT {CLAIM_COLS} FROM claims c WHERE c.id = ?1"))?
                .query_row([id], |row| map_claim(row, 0))
                .optional()
        })
    }

    pub fn find_claim(
        &self,
        lost_item_id: &str,
        found_item_id: &str,
        claimant_id: &str,
    ) -> Result<Option<ClaimRow>> {
        self.with_conn(|conn| {
            conn.prepare(&format!(
                "SELECT {CLAIM_COLS} FROM claims c \
                 WHERE c.lost_item_id = ?1 AND c.found_item_id = ?2 AND c.claimant_id = ?3"
            ))?
            .query_row(params![lost_item_id, found_item_id, claimant_id], |row| {
                map_claim(row, 0)
            })
            .optional()
        })
    }

    /// Create a claim and flip the associated match to `claimed` in one
    /// transaction. Returns false when the (lost, found, claimant) triple
    /// already exists — the schema constraint is the final arbiter.
    pub fn insert_claim(
        &self,
        id: &str,
        lost_item_id: &str,
        found_item_id: &str,
        claimant_id: &str,
        verification_answer: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT INTO claims (id, lost_item_id, found_item_id, claimant_id, \
                 verification_answer) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, lost_item_id, found_item_id, claimant_id, verification_answer],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
            tx.execute(
                "UPDATE matches SET status = 'claimed' \
                 WHERE lost_item_id = ?1 AND found_item_id = ?2",
                params![lost_item_id, found_item_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn set_claim_proof(
        &self,
        claim_id: &str,
        proof_photo_url: Option<&str>,
        verification_status: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE claims SET proof_photo_url = ?2, verification_status = ?3 WHERE id = ?1",
                params![claim_id, proof_photo_url, verification_status],
            )?;
            Ok(())
        })
    }

    /// Approve a claim: claim, both item statuses, and exactly one finder
    /// reward commit together. Returns false when the claim was already
    /// approved — the conditional UPDATE inside the transaction is the
    /// double-reward guard.
    pub fn approve_claim(
        &self,
        claim_id: &str,
        lost_item_id: &str,
        found_item_id: &str,
        verified_by: Option<&str>,
        reward: &NewReward,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE claims SET status = 'approved', verification_status = 'verified', \
                 verified_by = ?2, verified_at = datetime('now') \
                 WHERE id = ?1 AND status != 'approved'",
                params![claim_id, verified_by],
            )?;
            if updated == 0 {
                return Ok(false);
            }
            tx.execute(
                "UPDATE found_items SET status = 'claimed' WHERE id = ?1",
                [found_item_id],
            )?;
            tx.execute(
                "UPDATE lost_items SET status = 'found' WHERE id = ?1",
                [lost_item_id],
            )?;
            insert_reward(&tx, reward)?;
            tx.commit()?;
            Ok(true)
        })
    }

    /// Terminal status flip; no reward, no item mutation. Approved claims
    /// stay approved.
    pub fn reject_claim(&self, claim_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE claims SET status = 'rejected' \
                 WHERE id = ?1 AND status NOT IN ('approved', 'rejected')",
                [claim_id],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn claims_by_claimant(
        &self,
        claimant_id: &str,
    ) -> Result<Vec<(ClaimRow, LostItemRow, FoundItemRow)>> {
        self.claims_joined("c.claimant_id = ?1", claimant_id)
    }

    /// Claims filed against items this user found.
    pub fn claims_for_finder(
        &self,
        finder_id: &str,
    ) -> Result<Vec<(ClaimRow, LostItemRow, FoundItemRow)>> {
        self.claims_joined("f.user_id = ?1", finder_id)
    }

    fn claims_joined(
        &self,
        filter: &str,
        param: &str,
    ) -> Result<Vec<(ClaimRow, LostItemRow, FoundItemRow)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLAIM_COLS}, u.first_name || ' ' || u.last_name, {LOST_COLS}, \
                 {FOUND_COLS} \
                 FROM claims c \
                 JOIN lost_items l ON l.id = c.lost_item_id \
                 JOIN found_items f ON f.id = c.found_item_id \
                 LEFT JOIN users u ON u.id = c.claimant_id \
                 WHERE {filter} ORDER BY c.created_at DESC"
            ))?;
            let rows = stmt
                .query_map([param], |row| {
                    let mut claim = map_claim(row, 0)?;
                    claim.claimant_name = row.get(CLAIM_WIDTH)?;
                    Ok((
                        claim,
                        map_lost_item(row, CLAIM_WIDTH + 1)?,
                        map_found_item(row, CLAIM_WIDTH + 1 + LOST_WIDTH)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Claim chat --

    pub fn insert_message(
        &self,
        id: &str,
        claim_id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, claim_id, sender_id, receiver_id, content) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, claim_id, sender_id, receiver_id, content],
            )?;
            Ok(())
        })
    }

    pub fn messages_for_claim(&self, claim_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ms.id, ms.claim_id, ms.sender_id, ms.receiver_id, ms.content, \
                 ms.is_read, ms.created_at, u.first_name || ' ' || u.last_name \
                 FROM messages ms LEFT JOIN users u ON u.id = ms.sender_id \
                 WHERE ms.claim_id = ?1 ORDER BY ms.created_at ASC",
            )?;
            let rows = stmt
                .query_map([claim_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        claim_id: row.get(1)?,
                        sender_id: row.get(2)?,
                        receiver_id: row.get(3)?,
                        content: row.get(4)?,
                        is_read: row.get(5)?,
                        created_at: row.get(6)?,
                        sender_name: row
                            .get::<_, Option<String>>(7)?
                            .unwrap_or_else(|| "unknown".to_string()),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_messages_read(&self, claim_id: &str, receiver_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET is_read = 1 \
                 WHERE claim_id = ?1 AND receiver_id = ?2 AND is_read = 0",
                params![claim_id, receiver_id],
            )?;
            Ok(())
        })
    }

    // -- Rewards --

    pub fn total_points(&self, user_id: &str, school_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(points), 0) FROM rewards \
                 WHERE user_id = ?1 AND school_id = ?2",
                params![user_id, school_id],
                |row| row.get(0),
            )?;
            Ok(total)
        })
    }

    pub fn recent_rewards(
        &self,
        user_id: &str,
        school_id: &str,
        limit: u32,
    ) -> Result<Vec<RewardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, school_id, points, reason, related_item_id, related_type, \
                 created_at FROM rewards WHERE user_id = ?1 AND school_id = ?2 \
                 ORDER BY created_at DESC LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(params![user_id, school_id, limit], |row| {
                    Ok(RewardRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        school_id: row.get(2)?,
                        points: row.get(3)?,
                        reason: row.get(4)?,
                        related_item_id: row.get(5)?,
                        related_type: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Top point totals in a school. Ties break on user creation time so
    /// the ordering is deterministic.
    pub fn leaderboard(&self, school_id: &str, limit: u32) -> Result<Vec<LeaderboardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.first_name, u.last_name, SUM(r.points) AS total_points \
                 FROM rewards r JOIN users u ON u.id = r.user_id \
                 WHERE r.school_id = ?1 \
                 GROUP BY u.id, u.first_name, u.last_name \
                 ORDER BY total_points DESC, u.created_at ASC \
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![school_id, limit], |row| {
                    Ok(LeaderboardRow {
                        user_id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        total_points: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_reward(conn: &Connection, reward: &NewReward) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO rewards (id, user_id, school_id, points, reason, related_item_id, \
         related_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            reward.id,
            reward.user_id,
            reward.school_id,
            reward.points,
            reward.reason,
            reward.related_item_id,
            reward.related_type,
        ],
    )?;
    Ok(())
}

// -- Row mapping --

fn map_user(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: row.get(5)?,
        is_active: row.get(6)?,
        school_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_school(row: &Row) -> rusqlite::Result<SchoolRow> {
    Ok(SchoolRow {
        id: row.get(0)?,
        name: row.get(1)?,
        join_code: row.get(2)?,
        created_by: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_lost_item(row: &Row, base: usize) -> rusqlite::Result<LostItemRow> {
    Ok(LostItemRow {
        id: row.get(base)?,
        user_id: row.get(base + 1)?,
        school_id: row.get(base + 2)?,
        title: row.get(base + 3)?,
        description: row.get(base + 4)?,
        category: row.get(base + 5)?,
        color: row.get(base + 6)?,
        brand: row.get(base + 7)?,
        location: row.get(base + 8)?,
        lost_date: row.get(base + 9)?,
        photo_url: row.get(base + 10)?,
        verification_question: row.get(base + 11)?,
        verification_answer: row.get(base + 12)?,
        status: row.get(base + 13)?,
        created_at: row.get(base + 14)?,
        user_name: None,
    })
}

fn map_found_item(row: &Row, base: usize) -> rusqlite::Result<FoundItemRow> {
    Ok(FoundItemRow {
        id: row.get(base)?,
        user_id: row.get(base + 1)?,
        school_id: row.get(base + 2)?,
        title: row.get(base + 3)?,
        description: row.get(base + 4)?,
        category: row.get(base + 5)?,
        color: row.get(base + 6)?,
        brand: row.get(base + 7)?,
        location: row.get(base + 8)?,
        found_date: row.get(base + 9)?,
        photo_url: row.get(base + 10)?,
        status: row.get(base + 11)?,
        created_at: row.get(base + 12)?,
        user_name: None,
    })
}

fn map_match(row: &Row, base: usize) -> rusqlite::Result<MatchRow> {
    Ok(MatchRow {
        id: row.get(base)?,
        lost_item_id: row.get(base + 1)?,
        found_item_id: row.get(base + 2)?,
        confidence_score: row.get(base + 3)?,
        match_reasons: row.get(base + 4)?,
        status: row.get(base + 5)?,
        created_at: row.get(base + 6)?,
    })
}

fn map_claim(row: &Row, base: usize) -> rusqlite::Result<ClaimRow> {
    Ok(ClaimRow {
        id: row.get(base)?,
        lost_item_id: row.get(base + 1)?,
        found_item_id: row.get(base + 2)?,
        claimant_id: row.get(base + 3)?,
        verification_answer: row.get(base + 4)?,
        proof_photo_url: row.get(base + 5)?,
        verification_status: row.get(base + 6)?,
        verified_by: row.get(base + 7)?,
        verified_at: row.get(base + 8)?,
        status: row.get(base + 9)?,
        created_at: row.get(base + 10)?,
        claimant_name: None,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, id: &str, school_id: Option<&str>) {
        db.create_user(
            id,
            &format!("{id}@example.edu"),
            "argon2-hash",
            "Test",
            id,
            "student",
            school_id,
        )
        .unwrap();
    }

    /// Creator user + active school in one step.
    fn seed_school(db: &Database, school_id: &str, join_code: &str) {
        let admin = format!("admin-{school_id}");
        db.create_user(
            &admin,
            &format!("{admin}@example.edu"),
            "argon2-hash",
            "Admin",
            "User",
            "admin",
            None,
        )
        .unwrap();
        db.create_school(school_id, "Test High", join_code, &admin)
            .unwrap();
    }

    fn report_lost(db: &Database, id: &str, user_id: &str, school_id: &str) {
        let reward_id = format!("reward-{id}");
        db.insert_lost_item_with_reward(
            &NewLostItem {
                id,
                user_id,
                school_id,
                title: "Lost phone",
                description: "black iphone",
                category: "phone",
                color: "black",
                brand: "Apple",
                location: "library",
                lost_date: None,
                photo_url: None,
                verification_question: None,
                verification_answer: None,
            },
            &NewReward {
                id: &reward_id,
                user_id,
                school_id,
                points: 10,
                reason: "Reported lost item",
                related_item_id: Some(id),
                related_type: Some("lost"),
            },
        )
        .unwrap();
    }

    fn report_found(db: &Database, id: &str, user_id: &str, school_id: &str) {
        let reward_id = format!("reward-{id}");
        db.insert_found_item_with_reward(
            &NewFoundItem {
                id,
                user_id,
                school_id,
                title: "Found phone",
                description: "black iphone",
                category: "phone",
                color: "black",
                brand: "Apple",
                location: "library",
                found_date: None,
                photo_url: None,
            },
            &NewReward {
                id: &reward_id,
                user_id,
                school_id,
                points: 15,
                reason: "Reported found item",
                related_item_id: Some(id),
                related_type: Some("found"),
            },
        )
        .unwrap();
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            Ok(n)
        })
        .unwrap()
    }

    #[test]
    fn report_commits_item_and_reward_together() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "u1", Some("s1"));

        report_lost(&db, "lost1", "u1", "s1");

        assert!(db.get_lost_item("lost1").unwrap().is_some());
        assert_eq!(db.total_points("u1", "s1").unwrap(), 10);
    }

    #[test]
    fn claim_is_unique_per_triple() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");

        assert!(db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap());
        assert!(!db.insert_claim("c2", "lost1", "found1", "owner", "").unwrap());
        assert_eq!(count(&db, "claims"), 1);
    }

    #[test]
    fn claim_creation_marks_the_match_claimed() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.upsert_match("m1", "lost1", "found1", 80.0, "[]").unwrap();

        db.insert_claim("c1", "lost1", "found1", "owner", "blue case")
            .unwrap();

        let status: String = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT status FROM matches WHERE id = 'm1'", [], |r| {
                    r.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(status, "claimed");
    }

    #[test]
    fn approve_is_idempotent_and_grants_one_reward() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap();

        let reward = NewReward {
            id: "rw-approve",
            user_id: "finder",
            school_id: "s1",
            points: 50,
            reason: "Returned lost item",
            related_item_id: Some("found1"),
            related_type: Some("found"),
        };
        assert!(db.approve_claim("c1", "lost1", "found1", None, &reward).unwrap());

        let second = NewReward { id: "rw-approve-2", ..reward };
        assert!(!db.approve_claim("c1", "lost1", "found1", None, &second).unwrap());

        // Exactly one 50-point grant; finder also has the 15-point report grant.
        assert_eq!(db.total_points("finder", "s1").unwrap(), 65);
        assert_eq!(db.get_claim("c1").unwrap().unwrap().status, "approved");
        assert_eq!(db.get_lost_item("lost1").unwrap().unwrap().status, "found");
        assert_eq!(db.get_found_item("found1").unwrap().unwrap().status, "claimed");
    }

    #[test]
    fn rejecting_an_approved_claim_is_refused() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap();

        let reward = NewReward {
            id: "rw1",
            user_id: "finder",
            school_id: "s1",
            points: 50,
            reason: "Returned lost item",
            related_item_id: None,
            related_type: None,
        };
        db.approve_claim("c1", "lost1", "found1", None, &reward).unwrap();

        assert!(!db.reject_claim("c1").unwrap());
        assert_eq!(db.get_claim("c1").unwrap().unwrap().status, "approved");
    }

    #[test]
    fn match_upsert_keeps_the_higher_score() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");

        db.upsert_match("m1", "lost1", "found1", 60.0, "[\"a\"]").unwrap();
        db.upsert_match("m2", "lost1", "found1", 45.0, "[\"b\"]").unwrap();
        assert_eq!(count(&db, "matches"), 1);

        let matches = db.matches_for_owner("owner").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.confidence_score, 60.0);

        db.upsert_match("m3", "lost1", "found1", 85.0, "[\"c\"]").unwrap();
        let matches = db.matches_for_owner("owner").unwrap();
        assert_eq!(matches[0].0.confidence_score, 85.0);
    }

    #[test]
    fn deleting_a_lost_item_cascades() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.upsert_match("m1", "lost1", "found1", 70.0, "[]").unwrap();
        db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap();
        db.insert_message("msg1", "c1", "owner", "finder", "hi").unwrap();

        db.delete_lost_item("lost1").unwrap();

        assert!(db.get_lost_item("lost1").unwrap().is_none());
        assert_eq!(count(&db, "matches"), 0);
        assert_eq!(count(&db, "claims"), 0);
        assert_eq!(count(&db, "messages"), 0);
    }

    #[test]
    fn leaderboard_sums_and_orders_totals() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "u1", Some("s1"));
        seed_user(&db, "u2", Some("s1"));
        report_lost(&db, "lost1", "u1", "s1"); // u1: 10
        report_found(&db, "found1", "u2", "s1"); // u2: 15
        report_found(&db, "found2", "u2", "s1"); // u2: 30

        let board = db.leaderboard("s1", 10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "u2");
        assert_eq!(board[0].total_points, 30);
        assert_eq!(board[1].user_id, "u1");
        assert_eq!(board[1].total_points, 10);
    }

    #[test]
    fn join_code_lookup_ignores_deactivated_schools() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");

        assert!(db.get_school_by_join_code("ABC123").unwrap().is_some());
        assert!(db.get_school_by_join_code("ZZZ999").unwrap().is_none());

        db.deactivate_school("s1").unwrap();
        assert!(db.get_school_by_join_code("ABC123").unwrap().is_none());
    }

    #[test]
    fn reading_a_thread_marks_received_messages_read() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap();
        db.insert_message("msg1", "c1", "finder", "owner", "is this yours?")
            .unwrap();
        db.insert_message("msg2", "c1", "owner", "finder", "yes!").unwrap();

        db.mark_messages_read("c1", "owner").unwrap();

        let messages = db.messages_for_claim("c1").unwrap();
        let to_owner = messages.iter().find(|m| m.id == "msg1").unwrap();
        let to_finder = messages.iter().find(|m| m.id == "msg2").unwrap();
        assert!(to_owner.is_read);
        assert!(!to_finder.is_read);
        assert_eq!(to_owner.sender_name, "Test finder");
    }

    #[test]
    fn claim_listings_embed_both_items() {
        let db = test_db();
        seed_school(&db, "s1", "ABC123");
        seed_user(&db, "owner", Some("s1"));
        seed_user(&db, "finder", Some("s1"));
        report_lost(&db, "lost1", "owner", "s1");
        report_found(&db, "found1", "finder", "s1");
        db.insert_claim("c1", "lost1", "found1", "owner", "").unwrap();

        let mine = db.claims_by_claimant("owner").unwrap();
        assert_eq!(mine.len(), 1);
        let (claim, lost, found) = &mine[0];
        assert_eq!(claim.id, "c1");
        assert_eq!(claim.claimant_name.as_deref(), Some("Test owner"));
        assert_eq!(lost.id, "lost1");
        assert_eq!(found.id, "found1");

        let incoming = db.claims_for_finder("finder").unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(db.claims_for_finder("owner").unwrap().is_empty());
    }
}
