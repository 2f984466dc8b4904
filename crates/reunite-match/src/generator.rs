use crate::scoring::{ItemProfile, score};

/// Minimum confidence for a pairing to be persisted as a match.
/// One threshold for every call site, whichever side triggered the sweep.
pub const MATCH_THRESHOLD: u8 = 30;

/// A pool entry that scored above zero against the triggering item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    /// Index into the candidate pool the caller supplied.
    pub index: usize,
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Candidates for a newly reported lost item, drawn from the school's
/// open found items. Filtered to the threshold, highest confidence first.
pub fn matches_for_lost(lost: &ItemProfile, found_pool: &[ItemProfile]) -> Vec<ScoredCandidate> {
    qualifying(rank(found_pool, |found| score(lost, found)))
}

/// Candidates for a newly reported found item, drawn from the school's
/// active lost items. The scorer always takes (lost, found) in that order.
pub fn matches_for_found(found: &ItemProfile, lost_pool: &[ItemProfile]) -> Vec<ScoredCandidate> {
    qualifying(rank(lost_pool, |lost| score(lost, found)))
}

/// Score every pool entry, drop zero scores, sort by confidence descending.
/// The sort is stable so equal scores keep pool order.
fn rank<F>(pool: &[ItemProfile], score_one: F) -> Vec<ScoredCandidate>
where
    F: Fn(&ItemProfile) -> crate::scoring::MatchScore,
{
    let mut candidates: Vec<ScoredCandidate> = pool
        .iter()
        .enumerate()
        .filter_map(|(index, profile)| {
            let result = score_one(profile);
            (result.score > 0).then(|| ScoredCandidate {
                index,
                score: result.score,
                reasons: result.reasons,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn qualifying(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.score >= MATCH_THRESHOLD)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile<'a>(category: &'a str, color: &'a str, description: &'a str) -> ItemProfile<'a> {
        ItemProfile {
            title: "",
            description,
            category,
            color,
            brand: "",
            date: None,
        }
    }

    #[test]
    fn below_threshold_candidates_are_dropped() {
        let lost = profile("phone", "black", "");
        // 40 + 20 = 60 qualifies; 10 (similar color only) does not.
        let pool = vec![profile("phone", "black", ""), profile("charger", "jet black", "")];

        let matches = matches_for_lost(&lost, &pool);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 0);
        assert_eq!(matches[0].score, 60);
    }

    #[test]
    fn candidates_are_ordered_by_confidence() {
        let lost = profile("wallet", "brown", "leather wallet with zipper pouch");
        let pool = vec![
            profile("wallet", "", ""),                                  // 40
            profile("wallet", "brown", "brown leather wallet zipper"), // strongest
            profile("wallet", "brown", ""),                            // 60
        ];

        let matches = matches_for_lost(&lost, &pool);
        assert_eq!(matches.len(), 3);
        assert_eq!(
            matches.iter().map(|m| m.index).collect::<Vec<_>>(),
            vec![1, 2, 0]
        );
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn zero_score_pool_yields_no_matches() {
        let lost = profile("umbrella", "red", "");
        let pool = vec![profile("laptop", "silver", ""), profile("keys", "", "")];

        assert!(matches_for_lost(&lost, &pool).is_empty());
    }

    #[test]
    fn found_direction_scores_the_same_pair() {
        let lost = profile("phone", "black", "");
        let found = profile("phone", "black", "");

        let from_lost = matches_for_lost(&lost, std::slice::from_ref(&found));
        let from_found = matches_for_found(&found, std::slice::from_ref(&lost));
        assert_eq!(from_lost[0].score, from_found[0].score);
    }

    #[test]
    fn threshold_is_inclusive() {
        let lost = profile("phone", "", "");
        // Category partial (20) + similar color would be below; exact
        // category alone is 40 — craft a pool entry at exactly 30.
        let pool = vec![profile("smartphone", "", "black case with stickers")];
        // 20 similar category + 10 overlap needs shared words; keep it simple:
        let lost = ItemProfile {
            description: "black case",
            ..lost
        };

        let matches = matches_for_lost(&lost, &pool);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 30);
    }
}
