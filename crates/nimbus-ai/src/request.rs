//! Operation requests and result shapes.
//!
//! Every REST operation maps onto one `OperationRequest` variant, validated
//! at this boundary before any prompt is built or any backend call is made.

use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Which Gemini model tier serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    #[default]
    Flash,
    Pro,
}

/// A validated file payload handed over by the upload boundary: decoded
/// bytes plus the declared MIME type. This layer never sniffs formats.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl FilePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decode the payload as UTF-8 text, replacing invalid sequences.
    pub fn decoded_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Document analysis flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    #[default]
    Summary,
    KeyPoints,
    Sentiment,
    Entities,
}

/// Creative content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Story,
    Poem,
    Article,
    Code,
    #[default]
    General,
}

/// One field of an extraction schema: name plus a natural-language
/// description of what to extract. Order is significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub description: String,
}

/// A single embedding result, one per input text.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRecord {
    /// Truncated preview of the embedded text.
    pub text: String,
    pub embedding: Vec<f32>,
    pub dimensions: usize,
}

/// The closed set of operations this core executes.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    AnalyzeText {
        text: String,
        model: ModelChoice,
        temperature: Option<f32>,
    },
    Chat {
        message: String,
        model: ModelChoice,
        clear_history: bool,
    },
    Sentiment {
        text: String,
        detailed: bool,
    },
    Translate {
        text: String,
        target_language: String,
        source_language: String,
    },
    Summarize {
        text: String,
        length: SummaryLength,
        bullet_points: bool,
    },
    GrammarCheck {
        text: String,
        language: String,
    },
    AnalyzeImage {
        image: FilePayload,
        prompt: Option<String>,
    },
    CompareImages {
        first: FilePayload,
        second: FilePayload,
        prompt: Option<String>,
    },
    ExtractStructured {
        document: FilePayload,
        schema: Vec<SchemaField>,
    },
    AnalyzeDocument {
        document: FilePayload,
        analysis: AnalysisKind,
    },
    AnalyzeCsv {
        file: FilePayload,
        question: String,
    },
    GenerateContent {
        prompt: String,
        kind: ContentKind,
        temperature: Option<f32>,
    },
    Embeddings {
        texts: Vec<String>,
        task_type: String,
    },
}

fn require_text(value: &str, field: &str) -> Result<(), AiError> {
    if value.trim().is_empty() {
        return Err(AiError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn require_image(file: &FilePayload, field: &str) -> Result<(), AiError> {
    if file.bytes.is_empty() {
        return Err(AiError::InvalidInput(format!("{} has no content", field)));
    }
    if !file.mime_type.starts_with("image/") {
        return Err(AiError::InvalidInput(format!(
            "{} must be an image, got {}",
            field, file.mime_type
        )));
    }
    Ok(())
}

impl OperationRequest {
    /// Validate boundary constraints: every text field non-empty after
    /// trimming, every file payload non-empty, schemas well-formed.
    ///
    /// Upstream validation should already guarantee this; the check is kept
    /// so a broken caller yields `InvalidInput` instead of a garbage prompt.
    pub fn validate(&self) -> Result<(), AiError> {
        match self {
            OperationRequest::AnalyzeText { text, .. } => require_text(text, "text"),
            OperationRequest::Chat { message, .. } => require_text(message, "message"),
            OperationRequest::Sentiment { text, .. } => require_text(text, "text"),
            OperationRequest::Translate {
                text,
                target_language,
                ..
            } => {
                require_text(text, "text")?;
                require_text(target_language, "target_language")
            }
            OperationRequest::Summarize { text, .. } => require_text(text, "text"),
            OperationRequest::GrammarCheck { text, language } => {
                require_text(text, "text")?;
                require_text(language, "language")
            }
            OperationRequest::AnalyzeImage { image, .. } => require_image(image, "image"),
            OperationRequest::CompareImages { first, second, .. } => {
                require_image(first, "first image")?;
                require_image(second, "second image")
            }
            OperationRequest::ExtractStructured { document, schema } => {
                if document.bytes.is_empty() {
                    return Err(AiError::InvalidInput("document has no content".to_string()));
                }
                if schema.is_empty() {
                    return Err(AiError::InvalidInput("schema cannot be empty".to_string()));
                }
                for field in schema {
                    require_text(&field.name, "schema field name")?;
                }
                Ok(())
            }
            OperationRequest::AnalyzeDocument { document, .. } => {
                if document.bytes.is_empty() {
                    return Err(AiError::InvalidInput("document has no content".to_string()));
                }
                Ok(())
            }
            OperationRequest::AnalyzeCsv { file, question } => {
                if file.bytes.is_empty() {
                    return Err(AiError::InvalidInput("file has no content".to_string()));
                }
                require_text(question, "question")
            }
            OperationRequest::GenerateContent { prompt, .. } => require_text(prompt, "prompt"),
            OperationRequest::Embeddings { texts, .. } => {
                if texts.is_empty() {
                    return Err(AiError::InvalidInput("texts cannot be empty".to_string()));
                }
                for text in texts {
                    require_text(text, "text")?;
                }
                Ok(())
            }
        }
    }
}

/// Normalized result of one operation, shaped per the REST contract.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationOutcome {
    Analysis {
        response: String,
    },
    Chat {
        response: String,
        history_length: usize,
    },
    Sentiment {
        sentiment: String,
        detailed: bool,
    },
    Translation {
        translated_text: String,
    },
    Summary {
        summary: String,
    },
    Grammar {
        result: String,
    },
    ImageAnalysis {
        analysis: String,
    },
    ImageComparison {
        comparison: String,
    },
    Extraction {
        extracted_data: serde_json::Map<String, serde_json::Value>,
    },
    DocumentAnalysis {
        analysis: String,
    },
    CsvAnalysis {
        analysis: String,
    },
    GeneratedContent {
        content: String,
    },
    Embeddings {
        embeddings: Vec<EmbeddingRecord>,
        total_texts: usize,
    },
}
