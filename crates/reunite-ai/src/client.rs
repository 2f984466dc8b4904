use std::time::Duration;

use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::payloads::{
    ChatReply, ChatRequest, ChatTurn, ItemDetails, ProofVerification, SimilarityAnalysis,
    strip_code_fences,
};

/// Ordered fallbacks tried once each when the configured model is missing.
const FALLBACK_MODELS: &[&str] = &["llama3.2", "llama3", "llama2", "mistral", "phi"];

/// Bound on any single model call so degradation never blocks a request
/// indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One configured Ollama connection, shared across the process via
/// application state rather than a process-wide global.
pub struct AiClient {
    http: reqwest::Client,
    host: String,
    model: String,
}

impl AiClient {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            host: host.into(),
            model: model.into(),
        })
    }

    /// Stateless chat completion with model fallback.
    ///
    /// The configured model is tried first; a model-not-found class of
    /// failure walks the fallback list once per entry. Any other failure
    /// class surfaces immediately without retry.
    pub async fn chat(&self, messages: &[ChatTurn]) -> Result<String> {
        match self.chat_once(&self.model, messages).await {
            Ok(reply) => Ok(reply),
            Err(err) if is_model_missing(&err) => {
                warn!("Model {} unavailable, trying fallbacks: {}", self.model, err);
                let mut last = err;
                for fallback in FALLBACK_MODELS {
                    match self.chat_once(fallback, messages).await {
                        Ok(reply) => {
                            debug!("Answered with fallback model {}", fallback);
                            return Ok(reply);
                        }
                        Err(e) => last = e,
                    }
                }
                Err(anyhow!(
                    "model {} not found and no fallback model available: {}",
                    self.model,
                    last
                ))
            }
            Err(err) => Err(err),
        }
    }

    /// Extract item attributes from a photo. Never fails: an unreachable
    /// model or unusable reply degrades to the manual-entry defaults.
    pub async fn extract_details(&self, image: &[u8]) -> ItemDetails {
        let prompt = "Extract: category, color, brand, model, unique_features[], condition, \
                      description. Return JSON: {\"category\":\"phone\",\"color\":\"black\",\
                      \"brand\":\"Apple\",\"model\":\"iPhone 13\",\"unique_features\":[\"scratch\"],\
                      \"condition\":\"good\",\"description\":\"brief\"}";

        match self.vision_json(prompt.to_string(), image).await {
            Ok(details) => details,
            Err(err) => {
                warn!("Photo detail extraction unavailable: {}", err);
                ItemDetails::manual_entry()
            }
        }
    }

    /// Compare a photo against a found-item description. Neutral verdict
    /// (confidence 50) on any failure.
    pub async fn analyze_similarity(&self, image: &[u8], description: &str) -> SimilarityAnalysis {
        let prompt = format!(
            "Compare photo with: {}. Return JSON: {{\"match_confidence\":85,\
             \"visual_similarities\":[\"color match\"],\"differences\":[],\"analysis\":\"brief\"}}",
            truncate(description, 150)
        );

        match self.vision_json(prompt, image).await {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!("Photo similarity analysis unavailable: {}", err);
                SimilarityAnalysis::manual_review()
            }
        }
    }

    /// Judge a claim's proof photo. Neutral verdict on any failure —
    /// `is_valid_proof` stays true so the claim lands in human review.
    pub async fn verify_proof(
        &self,
        image: &[u8],
        description: &str,
        question: Option<&str>,
    ) -> ProofVerification {
        let mut prompt = format!("Verify proof photo. Item: {}", truncate(description, 120));
        if let Some(q) = question {
            prompt.push_str(&format!(" Q: {}", truncate(q, 80)));
        }
        prompt.push_str(
            " Return JSON: {\"verification_confidence\":90,\"is_valid_proof\":true,\
             \"evidence_found\":[\"feature\"],\"analysis\":\"brief\"}",
        );

        match self.vision_json(prompt, image).await {
            Ok(verification) => verification,
            Err(err) => {
                warn!("Proof verification unavailable: {}", err);
                ProofVerification::manual_review()
            }
        }
    }

    /// One vision call: prompt + base64 image, fence-stripped JSON reply
    /// parsed into the requested payload type.
    async fn vision_json<T: DeserializeOwned>(&self, prompt: String, image: &[u8]) -> Result<T> {
        let turn = ChatTurn::user_with_image(prompt, BASE64.encode(image));
        let reply = self.chat(std::slice::from_ref(&turn)).await?;
        let parsed = serde_json::from_str(strip_code_fences(&reply))?;
        Ok(parsed)
    }

    async fn chat_once(&self, model: &str, messages: &[ChatTurn]) -> Result<String> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&ChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("model call failed ({}): {}", status, body));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply.message.content.trim().to_string())
    }
}

/// Ollama reports a missing model in the error body; everything else is a
/// different failure class and must not trigger the fallback walk.
fn is_model_missing(err: &anyhow::Error) -> bool {
    let text = err.to_string().to_lowercase();
    text.contains("not found") || text.contains("try pulling")
}

/// Truncate on a char boundary to keep prompts small.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_errors_are_classified() {
        assert!(is_model_missing(&anyhow!(
            "model call failed (404): model 'llava' not found"
        )));
        assert!(is_model_missing(&anyhow!("Try pulling it first")));
        assert!(!is_model_missing(&anyhow!("connection refused")));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 10), "ab");
        // Multi-byte chars must not be split mid-sequence.
        assert_eq!(truncate("héllo wörld", 6), "héllo ");
    }
}
