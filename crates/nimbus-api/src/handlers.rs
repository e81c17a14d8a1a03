//! Route handler functions for all API endpoints.
//!
//! Each handler deserializes a JSON request body, decodes any base64 file
//! payloads, hands a typed `OperationRequest` to the orchestrator, and
//! returns the normalized result as JSON.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use nimbus_ai::{
    AnalysisKind, ContentKind, ConversationTurn, FilePayload, ModelChoice, OperationOutcome,
    OperationRequest, SchemaField, SummaryLength,
};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request payload types
// =============================================================================

/// A file payload as it arrives on the wire: base64 data plus the declared
/// MIME type, already validated by the upload boundary.
#[derive(Debug, Deserialize)]
pub struct FileField {
    pub data: String,
    pub mime_type: String,
}

impl FileField {
    fn decode(&self) -> Result<FilePayload, ApiError> {
        let bytes = BASE64
            .decode(&self.data)
            .map_err(|e| ApiError::BadRequest(format!("invalid base64 file data: {}", e)))?;
        Ok(FilePayload::new(bytes, self.mime_type.clone()))
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_grammar_language() -> String {
    "español".to_string()
}

fn default_task_type() -> String {
    "retrieval_document".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    #[serde(default)]
    pub model: ModelChoice,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: ModelChoice,
    #[serde(default)]
    pub clear_history: bool,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
    #[serde(default)]
    pub detailed: bool,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub summary_length: SummaryLength,
    #[serde(default)]
    pub bullet_points: bool,
}

#[derive(Debug, Deserialize)]
pub struct GrammarCheckRequest {
    pub text: String,
    #[serde(default = "default_grammar_language")]
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeImageRequest {
    pub file: FileField,
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareImagesRequest {
    pub image1: FileField,
    pub image2: FileField,
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractStructuredRequest {
    pub file: FileField,
    /// Field name → description. Order is preserved end to end.
    pub schema: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeDocumentRequest {
    pub file: FileField,
    #[serde(default)]
    pub analysis_type: AnalysisKind,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeCsvRequest {
    pub file: FileField,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub prompt: String,
    #[serde(default)]
    pub content_type: ContentKind,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_task_type")]
    pub task_type: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<ConversationTurn>,
    pub total_messages: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub cleared: bool,
    pub messages_cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: ModelNames,
}

#[derive(Debug, Serialize)]
pub struct ModelNames {
    pub flash: String,
    pub pro: String,
    pub embedding: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub available: bool,
    pub flash_model: String,
    pub pro_model: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// =============================================================================
// AI operation handlers
// =============================================================================

pub async fn analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::AnalyzeText {
            text: req.text,
            model: req.model,
            temperature: req.temperature,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::Chat {
            message: req.message,
            model: req.model,
            clear_history: req.clear_history,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn chat_history(
    State(state): State<AppState>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let history = state.orchestrator()?.history()?;
    Ok(Json(ChatHistoryResponse {
        total_messages: history.len(),
        history,
    }))
}

pub async fn clear_chat_history(
    State(state): State<AppState>,
) -> Result<Json<ClearHistoryResponse>, ApiError> {
    let messages_cleared = state.orchestrator()?.clear_history()?;
    Ok(Json(ClearHistoryResponse {
        cleared: true,
        messages_cleared,
    }))
}

pub async fn sentiment(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::Sentiment {
            text: req.text,
            detailed: req.detailed,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::Translate {
            text: req.text,
            target_language: req.target_language,
            source_language: req.source_language,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::Summarize {
            text: req.text,
            length: req.summary_length,
            bullet_points: req.bullet_points,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn grammar_check(
    State(state): State<AppState>,
    Json(req): Json<GrammarCheckRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::GrammarCheck {
            text: req.text,
            language: req.language,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn analyze_image(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeImageRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::AnalyzeImage {
            image: req.file.decode()?,
            prompt: req.prompt,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn compare_images(
    State(state): State<AppState>,
    Json(req): Json<CompareImagesRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::CompareImages {
            first: req.image1.decode()?,
            second: req.image2.decode()?,
            prompt: req.prompt,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn extract_structured_data(
    State(state): State<AppState>,
    Json(req): Json<ExtractStructuredRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let schema = schema_fields(&req.schema)?;
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::ExtractStructured {
            document: req.file.decode()?,
            schema,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn analyze_document(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeDocumentRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::AnalyzeDocument {
            document: req.file.decode()?,
            analysis: req.analysis_type,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn analyze_csv(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeCsvRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::AnalyzeCsv {
            file: req.file.decode()?,
            question: req.question,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn generate_content(
    State(state): State<AppState>,
    Json(req): Json<GenerateContentRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::GenerateContent {
            prompt: req.prompt,
            kind: req.content_type,
            temperature: req.temperature,
        })
        .await?;
    Ok(Json(outcome))
}

pub async fn embeddings(
    State(state): State<AppState>,
    Json(req): Json<EmbeddingsRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state
        .orchestrator()?
        .execute(OperationRequest::Embeddings {
            texts: req.texts,
            task_type: req.task_type,
        })
        .await?;
    Ok(Json(outcome))
}

// =============================================================================
// Info handlers
// =============================================================================

pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let gemini = &state.config.gemini;
    Json(ModelsResponse {
        models: ModelNames {
            flash: gemini.flash_model.clone(),
            pro: gemini.pro_model.clone(),
            embedding: gemini.embedding_model.clone(),
        },
    })
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        available: state.ai_available(),
        flash_model: state.config.gemini.flash_model.clone(),
        pro_model: state.config.gemini.pro_model.clone(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Convert the wire schema object into ordered schema fields.
fn schema_fields(
    schema: &serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<SchemaField>, ApiError> {
    schema
        .iter()
        .map(|(name, description)| {
            let description = description.as_str().ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "schema field \"{}\" must map to a string description",
                    name
                ))
            })?;
            Ok(SchemaField {
                name: name.clone(),
                description: description.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_fields_preserve_order() {
        let json = r#"{"paciente": "nombre", "edad": "años", "diagnostico": "dx"}"#;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        let fields = schema_fields(&map).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["paciente", "edad", "diagnostico"]);
    }

    #[test]
    fn test_schema_fields_reject_non_string_description() {
        let json = r#"{"edad": 34}"#;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(schema_fields(&map).is_err());
    }

    #[test]
    fn test_file_field_decodes_base64() {
        let field = FileField {
            data: BASE64.encode(b"hola"),
            mime_type: "text/plain".to_string(),
        };
        let payload = field.decode().unwrap();
        assert_eq!(payload.bytes, b"hola");
        assert_eq!(payload.mime_type, "text/plain");
    }

    #[test]
    fn test_file_field_rejects_invalid_base64() {
        let field = FileField {
            data: "not base64!!".to_string(),
            mime_type: "text/plain".to_string(),
        };
        assert!(matches!(field.decode(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_translate_request_default_source() {
        let req: TranslateRequest =
            serde_json::from_str(r#"{"text": "Hello", "target_language": "español"}"#).unwrap();
        assert_eq!(req.source_language, "auto");
    }

    #[test]
    fn test_chat_request_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hola"}"#).unwrap();
        assert_eq!(req.model, ModelChoice::Flash);
        assert!(!req.clear_history);
    }

    #[test]
    fn test_embeddings_request_default_task_type() {
        let req: EmbeddingsRequest = serde_json::from_str(r#"{"texts": ["a"]}"#).unwrap();
        assert_eq!(req.task_type, "retrieval_document");
    }
}
