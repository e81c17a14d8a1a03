//! Orchestrator: the façade over builder, gateway, and session.
//!
//! Validates each request, builds its prompt, calls the gateway at most
//! once, and updates the conversation only for chat. Errors pass through
//! verbatim; this layer never retries and never degrades partially.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::backend::ModelBackend;
use crate::error::AiError;
use crate::extract;
use crate::prompt;
use crate::request::{
    EmbeddingRecord, ModelChoice, OperationOutcome, OperationRequest,
};
use crate::session::{ConversationSession, ConversationTurn};

/// Default temperature for creative content generation.
const CREATIVE_TEMPERATURE: f32 = 0.9;

/// Maximum characters of a text echoed back in an embedding record.
const EMBEDDING_PREVIEW_CHARS: usize = 100;

/// Central coordinator for all AI operations.
///
/// Owns the single conversation session behind a mutex; chat calls serialize
/// on it, all other operations are stateless and fully parallelizable.
pub struct Orchestrator {
    backend: Box<dyn ModelBackend>,
    session: Mutex<ConversationSession>,
}

impl Orchestrator {
    /// Create an orchestrator over the given backend.
    pub fn new(backend: impl ModelBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            session: Mutex::new(ConversationSession::new()),
        }
    }

    /// Execute one operation and return its normalized result.
    pub async fn execute(&self, request: OperationRequest) -> Result<OperationOutcome, AiError> {
        request.validate()?;

        match request {
            OperationRequest::AnalyzeText {
                text,
                model,
                temperature,
            } => {
                let temperature = temperature.and_then(prompt::clamp_temperature);
                let reply = self
                    .backend
                    .generate(model, &prompt::analyze_text(&text), temperature)
                    .await?;
                Ok(OperationOutcome::Analysis {
                    response: reply.text,
                })
            }

            OperationRequest::Chat {
                message,
                model,
                clear_history,
            } => self.chat(message, model, clear_history).await,

            OperationRequest::Sentiment { text, detailed } => {
                let reply = self
                    .backend
                    .generate(ModelChoice::Flash, &prompt::sentiment(&text, detailed), None)
                    .await?;
                Ok(OperationOutcome::Sentiment {
                    sentiment: reply.text,
                    detailed,
                })
            }

            OperationRequest::Translate {
                text,
                target_language,
                source_language,
            } => {
                let parts = prompt::translate(&text, &target_language, &source_language);
                let reply = self
                    .backend
                    .generate(ModelChoice::Flash, &parts, None)
                    .await?;
                Ok(OperationOutcome::Translation {
                    translated_text: reply.text,
                })
            }

            OperationRequest::Summarize {
                text,
                length,
                bullet_points,
            } => {
                let parts = prompt::summarize(&text, length, bullet_points);
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::Summary {
                    summary: reply.text,
                })
            }

            OperationRequest::GrammarCheck { text, language } => {
                let parts = prompt::grammar_check(&text, &language);
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::Grammar { result: reply.text })
            }

            OperationRequest::AnalyzeImage { image, prompt: p } => {
                let parts = prompt::analyze_image(&image, p.as_deref());
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::ImageAnalysis {
                    analysis: reply.text,
                })
            }

            OperationRequest::CompareImages {
                first,
                second,
                prompt: p,
            } => {
                let parts = prompt::compare_images(&first, &second, p.as_deref());
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::ImageComparison {
                    comparison: reply.text,
                })
            }

            OperationRequest::ExtractStructured { document, schema } => {
                let parts = extract::build_prompt(&document.decoded_text(), &schema);
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                let fields = extract::parse_reply(&reply.text, &schema)?;

                let mut extracted_data = serde_json::Map::new();
                for field in fields {
                    let value = match field.value {
                        Some(v) => serde_json::Value::String(v),
                        None => serde_json::Value::Null,
                    };
                    extracted_data.insert(field.name, value);
                }
                Ok(OperationOutcome::Extraction { extracted_data })
            }

            OperationRequest::AnalyzeDocument { document, analysis } => {
                let parts = prompt::analyze_document(&document.decoded_text(), analysis);
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::DocumentAnalysis {
                    analysis: reply.text,
                })
            }

            OperationRequest::AnalyzeCsv { file, question } => {
                let parts = prompt::analyze_csv(&file.decoded_text(), &question);
                let reply = self.backend.generate(ModelChoice::Pro, &parts, None).await?;
                Ok(OperationOutcome::CsvAnalysis {
                    analysis: reply.text,
                })
            }

            OperationRequest::GenerateContent {
                prompt: p,
                kind,
                temperature,
            } => {
                let temperature = temperature
                    .and_then(prompt::clamp_temperature)
                    .or(Some(CREATIVE_TEMPERATURE));
                let parts = prompt::generate_content(&p, kind);
                let reply = self
                    .backend
                    .generate(ModelChoice::Pro, &parts, temperature)
                    .await?;
                Ok(OperationOutcome::GeneratedContent {
                    content: reply.text,
                })
            }

            OperationRequest::Embeddings { texts, task_type } => {
                let mut embeddings = Vec::with_capacity(texts.len());
                for text in &texts {
                    let values = self.backend.embed(text, &task_type).await?;
                    embeddings.push(EmbeddingRecord {
                        text: preview(text),
                        dimensions: values.len(),
                        embedding: values,
                    });
                }
                Ok(OperationOutcome::Embeddings {
                    total_texts: embeddings.len(),
                    embeddings,
                })
            }
        }
    }

    /// Chat: append the user turn, call the gateway, append the assistant
    /// turn only on success.
    ///
    /// The user turn stays appended on failure so context is not silently
    /// lost; a failed turn therefore still consumes history.
    async fn chat(
        &self,
        message: String,
        model: ModelChoice,
        clear_history: bool,
    ) -> Result<OperationOutcome, AiError> {
        let prior = {
            let mut session = self.session()?;
            if clear_history {
                session.clear();
            }
            let prior = session.history();
            session.append_user(&message);
            prior
        };

        let parts = prompt::chat(&prior, &message);
        debug!(history_turns = prior.len(), "Chat turn dispatched");

        let reply = self.backend.generate(model, &parts, None).await?;

        let history_length = {
            let mut session = self.session()?;
            session.append_assistant(&reply.text);
            session.len()
        };

        Ok(OperationOutcome::Chat {
            response: reply.text,
            history_length,
        })
    }

    /// Snapshot of the conversation history.
    pub fn history(&self) -> Result<Vec<ConversationTurn>, AiError> {
        Ok(self.session()?.history())
    }

    /// Clear the conversation, returning how many turns were dropped.
    pub fn clear_history(&self) -> Result<usize, AiError> {
        Ok(self.session()?.clear())
    }

    fn session(&self) -> Result<MutexGuard<'_, ConversationSession>, AiError> {
        self.session
            .lock()
            .map_err(|e| AiError::Internal(format!("session lock poisoned: {}", e)))
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > EMBEDDING_PREVIEW_CHARS {
        let cut: String = text.chars().take(EMBEDDING_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
