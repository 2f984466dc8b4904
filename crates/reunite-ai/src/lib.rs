/// Reunite AI collaborator.
///
/// One configured Ollama connection, reused across calls and injected
/// through application state. Vision helpers (item detail extraction,
/// photo similarity, proof verification) degrade to neutral defaults on
/// any failure — they never surface an error to the caller. The chat
/// helper retries an ordered fallback model list when the configured
/// model is missing, and surfaces every other failure class as-is.

pub mod client;
pub mod payloads;

pub use client::AiClient;
pub use payloads::{ChatTurn, ItemDetails, ProofVerification, SimilarityAnalysis};
