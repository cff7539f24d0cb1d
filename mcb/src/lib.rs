//! Micro-Challenge Bot
//!
//! A terminal chatbot that asks an LLM for one small challenge to do today.
//! Each run is one session: an in-memory transcript seeded with a fixed
//! opening exchange, grown one user/model pair per line typed, and dropped
//! when the process exits.
//!
//! # Modules
//!
//! - [`transcript`] - Append-only turn log
//! - [`session`] - Session state (active / terminated)
//! - [`dispatch`] - Turn dispatcher: exit handling, completion calls, diagnostics
//! - [`llm`] - LLM client trait and Gemini implementation
//! - [`repl`] - Interactive terminal surface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod llm;
pub mod repl;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use config::{Config, LlmConfig, SessionConfig, UiConfig};
pub use dispatch::{DispatchOutcome, DispatchSettings, Dispatcher, EMPTY_REPLY_MESSAGE};
pub use llm::{CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, create_client};
pub use session::{Session, SessionError, SessionState};
pub use transcript::{Bootstrap, Role, Transcript, Turn};
