use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Common English words that carry no signal for description overlap.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "was", "are", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "must", "can", "this", "that", "these", "those", "i", "you",
    "he", "she", "it", "we", "they", "my", "your", "his", "her", "its", "our", "their",
];

/// The fields of a reported item that participate in scoring.
/// Built by the caller from whichever storage row it holds.
#[derive(Debug, Clone, Copy)]
pub struct ItemProfile<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub color: &'a str,
    pub brand: &'a str,
    /// Lost date for a lost item, found date for a found item.
    /// `None` when absent or unparseable — never an error.
    pub date: Option<DateTime<Utc>>,
}

/// Confidence score for one (lost, found) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    /// 0–100, additive weights capped at 100.
    pub score: u8,
    /// Human-readable reasons, in the order the components fired.
    pub reasons: Vec<String>,
}

/// Score one lost item against one found item.
///
/// Additive point budget: category 40 exact / 20 partial, color 20 / 10,
/// brand 20 exact only, description keyword overlap 20 / 10, +5 when the
/// found date falls strictly after the lost date. Capped at 100. Empty
/// fields never score — two absent brands are not a match.
pub fn score(lost: &ItemProfile, found: &ItemProfile) -> MatchScore {
    let mut total: u32 = 0;
    let mut reasons = Vec::new();

    // Category (40 exact / 20 substring)
    let lost_category = lost.category.to_lowercase();
    let found_category = found.category.to_lowercase();
    if !lost_category.is_empty() && lost_category == found_category {
        total += 40;
        reasons.push(format!("Category matches ({})", lost.category));
    } else if !lost_category.is_empty()
        && !found_category.is_empty()
        && (lost_category.contains(&found_category) || found_category.contains(&lost_category))
    {
        total += 20;
        reasons.push("Similar category".to_string());
    }

    // Color (20 exact / 10 substring)
    let lost_color = lost.color.to_lowercase();
    let found_color = found.color.to_lowercase();
    if !lost_color.is_empty() && lost_color == found_color {
        total += 20;
        reasons.push(format!("Color matches ({})", lost.color));
    } else if !lost_color.is_empty()
        && !found_color.is_empty()
        && (lost_color.contains(&found_color) || found_color.contains(&lost_color))
    {
        total += 10;
        reasons.push("Similar color".to_string());
    }

    // Brand (20 exact, no partial tier)
    let lost_brand = lost.brand.to_lowercase();
    let found_brand = found.brand.to_lowercase();
    if !lost_brand.is_empty() && lost_brand == found_brand {
        total += 20;
        reasons.push(format!("Brand matches ({})", lost.brand));
    }

    // Description keyword overlap (20 when >2 shared tokens, 10 when >0)
    let lost_words = keyword_set(lost.description, lost.title);
    let found_words = keyword_set(found.description, found.title);
    let common = lost_words.intersection(&found_words).count();
    if common > 2 {
        total += 20;
        reasons.push(format!("Description keywords match ({} words)", common));
    } else if common > 0 {
        total += 10;
        reasons.push(format!("Some description overlap ({} words)", common));
    }

    // Temporal bonus
    if let (Some(lost_date), Some(found_date)) = (lost.date, found.date) {
        if found_date > lost_date {
            total += 5;
            reasons.push("Found after lost date".to_string());
        }
    }

    let score = total.min(100) as u8;
    if score > 0 && reasons.is_empty() {
        // Defensive floor; unreachable with the weight table above.
        reasons.push("Basic match".to_string());
    }

    MatchScore { score, reasons }
}

/// Lowercased description+title tokens, stop words and tokens of
/// length <= 2 dropped.
fn keyword_set(description: &str, title: &str) -> HashSet<String> {
    let text = format!("{} {}", description, title).to_lowercase();
    text.split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Parse an item date as stored or as submitted by clients.
/// Accepts RFC 3339, the SQLite `YYYY-MM-DD HH:MM:SS` shape, and a bare
/// date. Anything else is `None` — unparseable dates simply contribute
/// nothing to the score.
pub fn parse_item_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile<'a>(
        title: &'a str,
        description: &'a str,
        category: &'a str,
        color: &'a str,
        brand: &'a str,
        date: Option<&str>,
    ) -> ItemProfile<'a> {
        ItemProfile {
            title,
            description,
            category,
            color,
            brand,
            date: date.and_then(parse_item_date),
        }
    }

    #[test]
    fn identical_phone_reports_score_100() {
        let lost = profile(
            "Lost iPhone",
            "lost my black iphone near library",
            "phone",
            "black",
            "Apple",
            None,
        );
        let found = profile(
            "Found phone",
            "found black iphone by library entrance",
            "phone",
            "black",
            "Apple",
            None,
        );

        let result = score(&lost, &found);
        // 40 category + 20 color + 20 brand + 20 description (black, iphone, library)
        assert_eq!(result.score, 100);
        assert!(result.reasons.iter().any(|r| r == "Category matches (phone)"));
        assert!(result.reasons.iter().any(|r| r == "Color matches (black)"));
        assert!(result.reasons.iter().any(|r| r == "Brand matches (Apple)"));
        assert!(
            result
                .reasons
                .iter()
                .any(|r| r == "Description keywords match (3 words)")
        );
    }

    #[test]
    fn date_bonus_is_absorbed_by_the_cap() {
        let lost = profile(
            "Lost iPhone",
            "lost my black iphone near library",
            "phone",
            "black",
            "Apple",
            Some("2026-03-01T10:00:00Z"),
        );
        let found = profile(
            "Found phone",
            "found black iphone by library entrance",
            "phone",
            "black",
            "Apple",
            Some("2026-03-02T09:00:00Z"),
        );

        let result = score(&lost, &found);
        assert_eq!(result.score, 100);
        assert!(result.reasons.iter().any(|r| r == "Found after lost date"));
    }

    #[test]
    fn disjoint_items_score_zero_with_no_reasons() {
        let lost = profile("Lost umbrella", "red umbrella", "umbrella", "red", "Totes", None);
        let found = profile("Found laptop", "silver laptop", "laptop", "silver", "Dell", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn bag_vs_backpack_fails_the_substring_test_both_ways() {
        let lost = profile("Lost bag", "", "bag", "", "", None);
        let found = profile("Found backpack", "", "backpack", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn substring_category_scores_partial() {
        let lost = profile("", "", "phone", "", "", None);
        let found = profile("", "", "smartphone", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 20);
        assert_eq!(result.reasons, vec!["Similar category".to_string()]);
    }

    #[test]
    fn substring_color_scores_partial() {
        let lost = profile("", "", "wallet", "dark blue", "", None);
        let found = profile("", "", "wallet", "blue", "", None);

        let result = score(&lost, &found);
        // 40 category + 10 similar color
        assert_eq!(result.score, 50);
        assert!(result.reasons.iter().any(|r| r == "Similar color"));
    }

    #[test]
    fn brand_match_is_case_insensitive_and_exact_only() {
        let exact = score(
            &profile("", "", "", "", "Apple", None),
            &profile("", "", "", "", "apple", None),
        );
        assert_eq!(exact.score, 20);

        let partial = score(
            &profile("", "", "", "", "Apple", None),
            &profile("", "", "", "", "Apple Inc", None),
        );
        assert_eq!(partial.score, 0);
    }

    #[test]
    fn empty_fields_never_score() {
        let lost = profile("", "", "", "", "", None);
        let found = profile("", "", "", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn one_or_two_shared_keywords_score_ten() {
        let lost = profile("", "blue hydroflask bottle", "", "", "", None);
        let found = profile("", "scratched hydroflask", "", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 10);
        assert_eq!(
            result.reasons,
            vec!["Some description overlap (1 words)".to_string()]
        );
    }

    #[test]
    fn stop_words_and_short_tokens_are_ignored() {
        // Shared words are all stop words or <= 2 chars.
        let lost = profile("", "it was in my of at", "", "", "", None);
        let found = profile("", "it was in my of at", "", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn title_tokens_count_toward_overlap() {
        let lost = profile("casio calculator watch", "", "", "", "", None);
        let found = profile("", "found casio calculator watch", "", "", "", None);

        let result = score(&lost, &found);
        assert_eq!(result.score, 20);
    }

    #[test]
    fn found_before_lost_earns_no_bonus() {
        let lost = profile("", "", "wallet", "", "", Some("2026-03-05T00:00:00Z"));
        let found = profile("", "", "wallet", "", "", Some("2026-03-01T00:00:00Z"));

        let result = score(&lost, &found);
        assert_eq!(result.score, 40);
        assert!(!result.reasons.iter().any(|r| r == "Found after lost date"));
    }

    #[test]
    fn missing_or_unparseable_dates_are_ignored() {
        let lost = profile("", "", "wallet", "", "", None);
        let found = profile("", "", "wallet", "", "", Some("2026-03-01T00:00:00Z"));

        assert_eq!(score(&lost, &found).score, 40);
        assert_eq!(parse_item_date("next tuesday"), None);
    }

    #[test]
    fn parse_item_date_accepts_stored_shapes() {
        assert!(parse_item_date("2026-03-01T10:00:00Z").is_some());
        assert!(parse_item_date("2026-03-01 10:00:00").is_some());
        assert!(parse_item_date("2026-03-01").is_some());
        assert!(parse_item_date("").is_none());
    }
}
