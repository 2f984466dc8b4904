/// Reunite matching engine.
///
/// Pure, deterministic pairing of lost items against found items:
/// - `scoring`: per-pair confidence score (0–100) with human-readable reasons
/// - `generator`: ranks a candidate pool and applies the match threshold
///
/// No I/O here — persistence of qualifying matches belongs to the caller.

pub mod generator;
pub mod scoring;

pub use generator::{MATCH_THRESHOLD, ScoredCandidate, matches_for_found, matches_for_lost};
pub use scoring::{ItemProfile, MatchScore, parse_item_date, score};
