//! Generation request payload.

use crate::GenerationConfig;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::Serialize;
use std::sync::Arc;

/// One prompt bound to the batch configuration.
///
/// Serializes to the server wire format:
/// `{"prompt": ..., "llm_config": {...}, "adapter_name": null}`.
/// `adapter_name` is always present, even when no adapter is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, Builder)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// Prompt text
    prompt: String,
    /// Shared, read-only batch configuration
    #[serde(rename = "llm_config")]
    config: Arc<GenerationConfig>,
    /// Optional fine-tuning adapter
    #[builder(default)]
    adapter_name: Option<String>,
}

impl GenerationRequest {
    /// Bind a prompt to a shared configuration.
    pub fn new(
        prompt: impl Into<String>,
        config: Arc<GenerationConfig>,
        adapter_name: Option<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            config,
            adapter_name,
        }
    }

    /// Creates a new builder for GenerationRequest.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// JSON text of the configuration, as carried by the gRPC payload.
    pub fn config_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.config.as_ref())
    }
}
