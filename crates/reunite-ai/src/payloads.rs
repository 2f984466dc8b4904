//! Wire types for the Ollama chat endpoint and the loosely-typed JSON the
//! vision prompts ask the model to produce. Model output is not trusted:
//! every field has a default baked in, and a reply that fails to parse at
//! all falls back to the neutral constructors on each struct.

use serde::{Deserialize, Serialize};

// -- /api/chat --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: None,
        }
    }

    pub fn user_with_image(content: impl Into<String>, image_b64: String) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: Some(vec![image_b64]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatReplyMessage {
    #[serde(default)]
    pub content: String,
}

// -- Vision payloads --

/// Item attributes extracted from a photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub unique_features: Vec<String>,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub description: String,
}

impl ItemDetails {
    /// Fallback when the photo could not be analysed at all.
    pub fn manual_entry() -> Self {
        Self {
            category: default_category(),
            color: String::new(),
            brand: String::new(),
            model: String::new(),
            unique_features: Vec::new(),
            condition: "unknown".to_string(),
            description: "Please fill in item details manually".to_string(),
        }
    }
}

/// Visual comparison of a photo against a found-item description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityAnalysis {
    #[serde(default = "default_confidence")]
    pub match_confidence: f64,
    #[serde(default)]
    pub visual_similarities: Vec<String>,
    #[serde(default)]
    pub differences: Vec<String>,
    #[serde(default)]
    pub analysis: String,
}

impl SimilarityAnalysis {
    pub fn manual_review() -> Self {
        Self {
            match_confidence: default_confidence(),
            visual_similarities: vec!["Photo submitted - manual review recommended".to_string()],
            differences: Vec::new(),
            analysis: "Photo submitted but AI analysis unavailable. Please review manually."
                .to_string(),
        }
    }
}

/// Proof-photo verdict for a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofVerification {
    #[serde(default = "default_confidence")]
    pub verification_confidence: f64,
    /// Defaults to true so an unreadable verdict lands in human review
    /// instead of auto-rejecting a legitimate claimant.
    #[serde(default = "default_true")]
    pub is_valid_proof: bool,
    #[serde(default)]
    pub evidence_found: Vec<String>,
    #[serde(default)]
    pub analysis: String,
}

impl ProofVerification {
    pub fn manual_review() -> Self {
        Self {
            verification_confidence: default_confidence(),
            is_valid_proof: true,
            evidence_found: vec!["Manual review required - API unavailable".to_string()],
            analysis: "Photo submitted but AI verification unavailable. Please review manually."
                .to_string(),
        }
    }
}

fn default_category() -> String {
    "other".to_string()
}

fn default_condition() -> String {
    "unknown".to_string()
}

fn default_confidence() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

/// Models love to wrap JSON in markdown fences; peel them off.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_and_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn partial_verification_json_gets_safe_defaults() {
        let parsed: ProofVerification = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.verification_confidence, 50.0);
        assert!(parsed.is_valid_proof);
        assert!(parsed.evidence_found.is_empty());
    }

    #[test]
    fn partial_details_json_keeps_known_fields() {
        let parsed: ItemDetails =
            serde_json::from_str(r#"{"category":"phone","color":"black"}"#).unwrap();
        assert_eq!(parsed.category, "phone");
        assert_eq!(parsed.color, "black");
        assert_eq!(parsed.condition, "unknown");
        assert!(parsed.unique_features.is_empty());
    }

    #[test]
    fn similarity_defaults_are_neutral() {
        let parsed: SimilarityAnalysis = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.match_confidence, 50.0);
    }
}
