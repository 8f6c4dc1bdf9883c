//! Per-request generation outcomes.

use crate::{Chunk, EndpointMode, extract_text};
use derive_getters::Getters;
use fanout_error::ClientError;
use std::time::Duration;

/// Successful response content.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GenerationOutput {
    /// Response body (single-shot) or received payloads joined by newlines (streaming)
    raw_response: String,
    /// Ordered chunks; empty for single-shot responses
    chunks: Vec<Chunk>,
}

impl GenerationOutput {
    /// Output of a single-shot request.
    pub fn single(raw_response: impl Into<String>) -> Self {
        Self {
            raw_response: raw_response.into(),
            chunks: Vec::new(),
        }
    }

    /// Output assembled from an ordered chunk sequence.
    pub fn streamed(chunks: Vec<Chunk>) -> Self {
        let raw_response = chunks
            .iter()
            .map(|chunk| chunk.raw().as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            raw_response,
            chunks,
        }
    }

    /// Generated text: chunk texts concatenated, or the text extracted from the body.
    pub fn text(&self) -> String {
        if self.chunks.is_empty() {
            extract_text(&self.raw_response)
        } else {
            self.chunks.iter().map(|chunk| chunk.text().as_str()).collect()
        }
    }
}

/// Success or recorded failure of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    /// Response received in full
    Success(GenerationOutput),
    /// Request failed; siblings are unaffected
    Failure(ClientError),
}

/// Outcome of one request in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GenerationResult {
    /// Position of the prompt in the submitted list
    index: usize,
    /// Prompt text
    prompt: String,
    /// Endpoint the request targeted
    mode: EndpointMode,
    /// Success or failure
    status: GenerationStatus,
    /// Time from issuance to completion
    elapsed: Duration,
}

impl GenerationResult {
    /// Record a completed request.
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        mode: EndpointMode,
        status: GenerationStatus,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            mode,
            status,
            elapsed,
        }
    }

    /// Whether the request succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, GenerationStatus::Success(_))
    }

    /// Successful output, if any.
    pub fn output(&self) -> Option<&GenerationOutput> {
        match &self.status {
            GenerationStatus::Success(output) => Some(output),
            GenerationStatus::Failure(_) => None,
        }
    }

    /// Recorded failure, if any.
    pub fn error(&self) -> Option<&ClientError> {
        match &self.status {
            GenerationStatus::Success(_) => None,
            GenerationStatus::Failure(err) => Some(err),
        }
    }

    /// Generated text of a successful request.
    pub fn text(&self) -> Option<String> {
        self.output().map(GenerationOutput::text)
    }
}
