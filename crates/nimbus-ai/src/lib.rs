//! AI request orchestration and conversation state for Nimbus.
//!
//! Turns heterogeneous inputs (text, image bytes, document/CSV content,
//! extraction schemas) into multimodal Gemini requests, tracks the multi-turn
//! conversation, and normalizes model replies into structured results.

pub mod backend;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod session;

pub use backend::{
    GeminiBackend, MockBackend, MockFailure, ModelBackend, ModelReply, PromptPart, RetryPolicy,
};
pub use error::AiError;
pub use extract::ExtractedField;
pub use orchestrator::Orchestrator;
pub use request::{
    AnalysisKind, ContentKind, EmbeddingRecord, FilePayload, ModelChoice, OperationOutcome,
    OperationRequest, SchemaField, SummaryLength,
};
pub use session::{ConversationSession, ConversationTurn, Role};
