use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'student',
            is_active   INTEGER NOT NULL DEFAULT 1,
            school_id   TEXT REFERENCES schools(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS schools (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            join_code   TEXT NOT NULL UNIQUE,
            created_by  TEXT NOT NULL REFERENCES users(id),
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- status: active | found | closed
        CREATE TABLE IF NOT EXISTS lost_items (
            id                     TEXT PRIMARY KEY,
            user_id                TEXT NOT NULL REFERENCES users(id),
            school_id              TEXT NOT NULL REFERENCES schools(id),
            title                  TEXT NOT NULL,
            description            TEXT NOT NULL DEFAULT '',
            category               TEXT NOT NULL,
            color                  TEXT NOT NULL DEFAULT '',
            brand                  TEXT NOT NULL DEFAULT '',
            location               TEXT NOT NULL DEFAULT '',
            lost_date              TEXT,
            photo_url              TEXT,
            verification_question  TEXT,
            verification_answer    TEXT,
            status                 TEXT NOT NULL DEFAULT 'active',
            created_at             TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_lost_items_school
            ON lost_items(school_id, status);

        -- status: available | claimed | returned
        CREATE TABLE IF NOT EXISTS found_items (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            school_id   TEXT NOT NULL REFERENCES schools(id),
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category    TEXT NOT NULL,
            color       TEXT NOT NULL DEFAULT '',
            brand       TEXT NOT NULL DEFAULT '',
            location    TEXT NOT NULL DEFAULT '',
            found_date  TEXT,
            photo_url   TEXT,
            status      TEXT NOT NULL DEFAULT 'available',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_found_items_school
            ON found_items(school_id, status);

        -- One row per (lost, found) pair; re-scoring keeps the higher
        -- confidence. status: pending | viewed | dismissed | claimed
        CREATE TABLE IF NOT EXISTS matches (
            id               TEXT PRIMARY KEY,
            lost_item_id     TEXT NOT NULL REFERENCES lost_items(id) ON DELETE CASCADE,
            found_item_id    TEXT NOT NULL REFERENCES found_items(id) ON DELETE CASCADE,
            confidence_score REAL NOT NULL,
            match_reasons    TEXT NOT NULL DEFAULT '[]',
            status           TEXT NOT NULL DEFAULT 'pending',
            created_at       TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(lost_item_id, found_item_id)
        );

        CREATE INDEX IF NOT EXISTS idx_matches_lost
            ON matches(lost_item_id);

        -- verification_status: pending | verified | rejected
        -- status: pending | approved | rejected | completed
        CREATE TABLE IF NOT EXISTS claims (
            id                  TEXT PRIMARY KEY,
            lost_item_id        TEXT NOT NULL REFERENCES lost_items(id) ON DELETE CASCADE,
            found_item_id       TEXT NOT NULL REFERENCES found_items(id) ON DELETE CASCADE,
            claimant_id         TEXT NOT NULL REFERENCES users(id),
            verification_answer TEXT NOT NULL DEFAULT '',
            proof_photo_url     TEXT,
            verification_status TEXT NOT NULL DEFAULT 'pending',
            verified_by         TEXT REFERENCES users(id),
            verified_at         TEXT,
            status              TEXT NOT NULL DEFAULT 'pending',
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(lost_item_id, found_item_id, claimant_id)
        );

        CREATE INDEX IF NOT EXISTS idx_claims_found
            ON claims(found_item_id);
        CREATE INDEX IF NOT EXISTS idx_claims_claimant
            ON claims(claimant_id);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            claim_id    TEXT NOT NULL REFERENCES claims(id) ON DELETE CASCADE,
            sender_id   TEXT NOT NULL REFERENCES users(id),
            receiver_id TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            is_read     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_claim
            ON messages(claim_id, created_at);

        -- Append-only point grants; totals are always computed by summation.
        CREATE TABLE IF NOT EXISTS rewards (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id),
            school_id       TEXT NOT NULL REFERENCES schools(id),
            points          INTEGER NOT NULL,
            reason          TEXT NOT NULL,
            related_item_id TEXT,
            related_type    TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_rewards_user_school
            ON rewards(user_id, school_id);
        CREATE INDEX IF NOT EXISTS idx_rewards_school
            ON rewards(school_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
