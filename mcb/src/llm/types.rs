//! LLM request/response types
//!
//! Provider-agnostic shapes for a single completion call. Conversation
//! history travels as transcript turns; providers translate roles as needed.

use crate::transcript::Turn;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation history, oldest first, ending with the new user turn
    pub messages: Vec<Turn>,

    /// Sampling temperature
    pub temperature: f32,

    /// Max tokens for the reply
    pub max_tokens: u32,
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content, `None` when the provider returned nothing usable
    pub content: Option<String>,

    /// Provider-reported reason generation stopped
    pub finish_reason: Option<String>,

    /// Token usage for logging
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Reply text if there is any non-blank content
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
