//! Prompt builders: one pure function per operation.
//!
//! Given validated inputs these deterministically produce the instruction
//! text and part ordering for the gateway. Wording matches the service's
//! original Spanish instructions and is pinned by the tests below.

use crate::backend::PromptPart;
use crate::request::{AnalysisKind, ContentKind, FilePayload, SummaryLength};
use crate::session::ConversationTurn;

/// Default instruction when an image analysis request carries no prompt.
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe esta imagen en detalle";

/// Default instruction when an image comparison request carries no prompt.
pub const DEFAULT_COMPARISON_PROMPT: &str =
    "Compara estas dos imágenes y describe sus diferencias y similitudes";

/// Clamp a requested temperature into the accepted range.
///
/// Out-of-range values are clamped to [0.0, 2.0] rather than rejected;
/// NaN yields `None` so the configured default applies.
pub fn clamp_temperature(temperature: f32) -> Option<f32> {
    if temperature.is_nan() {
        None
    } else {
        Some(temperature.clamp(0.0, 2.0))
    }
}

/// Free-form text analysis: the text is the whole prompt.
pub fn analyze_text(text: &str) -> Vec<PromptPart> {
    vec![PromptPart::Text(text.to_string())]
}

/// Chat: prior turns as ordered text parts, then the new message.
pub fn chat(history: &[ConversationTurn], message: &str) -> Vec<PromptPart> {
    let mut parts: Vec<PromptPart> = history
        .iter()
        .map(|turn| PromptPart::Text(turn.text.clone()))
        .collect();
    parts.push(PromptPart::Text(message.to_string()));
    parts
}

/// Sentiment analysis, terse or detailed.
pub fn sentiment(text: &str, detailed: bool) -> Vec<PromptPart> {
    let instruction = if detailed {
        format!(
            "Analiza el sentimiento del siguiente texto y proporciona:\n\
             1. Sentimiento general (positivo/negativo/neutral)\n\
             2. Score de confianza (0-100)\n\
             3. Emociones detectadas\n\
             4. Aspectos específicos y su sentimiento\n\n\
             Texto: {}\n\n\
             Responde en formato JSON.",
            text
        )
    } else {
        format!(
            "Analiza el sentimiento del siguiente texto.\n\
             Responde solo con: \"positivo\", \"negativo\" o \"neutral\"\n\n\
             Texto: {}",
            text
        )
    };
    vec![PromptPart::Text(instruction)]
}

/// Translation; `source_language = "auto"` lets the model detect it.
pub fn translate(text: &str, target_language: &str, source_language: &str) -> Vec<PromptPart> {
    let instruction = if source_language == "auto" {
        format!("Traduce el siguiente texto a {}:\n\n{}", target_language, text)
    } else {
        format!(
            "Traduce el siguiente texto de {} a {}:\n\n{}",
            source_language, target_language, text
        )
    };
    vec![PromptPart::Text(instruction)]
}

/// Summarization with a length target and optional bullet formatting.
pub fn summarize(text: &str, length: SummaryLength, bullet_points: bool) -> Vec<PromptPart> {
    let length_instruction = match length {
        SummaryLength::Short => "muy breve (2-3 oraciones)",
        SummaryLength::Medium => "moderado (1 párrafo)",
        SummaryLength::Long => "detallado (2-3 párrafos)",
    };
    let format_instruction = if bullet_points {
        "en formato de puntos clave"
    } else {
        "en formato de párrafo"
    };
    vec![PromptPart::Text(format!(
        "Resume el siguiente texto de forma {} {}:\n\n{}",
        length_instruction, format_instruction, text
    ))]
}

/// Grammar and spelling review.
pub fn grammar_check(text: &str, language: &str) -> Vec<PromptPart> {
    vec![PromptPart::Text(format!(
        "Revisa el siguiente texto en {} y proporciona:\n\
         1. Texto corregido\n\
         2. Lista de errores encontrados\n\
         3. Sugerencias de mejora\n\n\
         Texto original:\n{}\n\n\
         Responde en formato JSON con las claves: \"texto_corregido\", \"errores\", \"sugerencias\"",
        language, text
    ))]
}

/// Image analysis: one instruction, one binary part.
pub fn analyze_image(image: &FilePayload, prompt: Option<&str>) -> Vec<PromptPart> {
    vec![
        PromptPart::Text(prompt.unwrap_or(DEFAULT_IMAGE_PROMPT).to_string()),
        PromptPart::Image {
            mime_type: image.mime_type.clone(),
            bytes: image.bytes.clone(),
        },
    ]
}

/// Image comparison: one instruction referencing both images, then both
/// binary parts in order.
pub fn compare_images(
    first: &FilePayload,
    second: &FilePayload,
    prompt: Option<&str>,
) -> Vec<PromptPart> {
    vec![
        PromptPart::Text(prompt.unwrap_or(DEFAULT_COMPARISON_PROMPT).to_string()),
        PromptPart::Image {
            mime_type: first.mime_type.clone(),
            bytes: first.bytes.clone(),
        },
        PromptPart::Image {
            mime_type: second.mime_type.clone(),
            bytes: second.bytes.clone(),
        },
    ]
}

/// Document analysis: the decoded document as a text segment preceding the
/// instruction. These operations reason over decoded content, so the bytes
/// are never attached as a binary part.
pub fn analyze_document(document_text: &str, analysis: AnalysisKind) -> Vec<PromptPart> {
    let instruction = match analysis {
        AnalysisKind::Summary => "Resume el documento anterior de forma concisa.",
        AnalysisKind::KeyPoints => "Extrae los puntos clave del documento anterior.",
        AnalysisKind::Sentiment => "Analiza el sentimiento y tono del documento anterior.",
        AnalysisKind::Entities => {
            "Identifica las entidades principales (personas, lugares, organizaciones) \
             en el documento anterior."
        }
    };
    vec![
        PromptPart::Text(format!("Documento:\n{}", document_text)),
        PromptPart::Text(instruction.to_string()),
    ]
}

/// Tabular analysis: the data as a text segment preceding the question.
pub fn analyze_csv(data_text: &str, question: &str) -> Vec<PromptPart> {
    vec![
        PromptPart::Text(format!("Datos:\n{}", data_text)),
        PromptPart::Text(format!(
            "Analiza los datos anteriores y responde la pregunta:\n{}",
            question
        )),
    ]
}

/// Creative content generation with a kind-specific prefix.
pub fn generate_content(prompt: &str, kind: ContentKind) -> Vec<PromptPart> {
    let prefix = match kind {
        ContentKind::Story => "Escribe una historia creativa sobre:",
        ContentKind::Poem => "Escribe un poema sobre:",
        ContentKind::Article => "Escribe un artículo informativo sobre:",
        ContentKind::Code => "Genera código para:",
        ContentKind::General => "",
    };
    let full = if prefix.is_empty() {
        prompt.to_string()
    } else {
        format!("{} {}", prefix, prompt)
    };
    vec![PromptPart::Text(full)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ConversationSession, Role};

    fn text_of(parts: &[PromptPart], index: usize) -> &str {
        match &parts[index] {
            PromptPart::Text(text) => text,
            PromptPart::Image { .. } => panic!("expected text part at {}", index),
        }
    }

    fn image_mime(parts: &[PromptPart], index: usize) -> &str {
        match &parts[index] {
            PromptPart::Image { mime_type, .. } => mime_type,
            PromptPart::Text(_) => panic!("expected image part at {}", index),
        }
    }

    // ---- Determinism ----

    #[test]
    fn test_builders_are_deterministic() {
        let a = sentiment("me encanta", true);
        let b = sentiment("me encanta", true);
        assert_eq!(text_of(&a, 0), text_of(&b, 0));
    }

    // ---- Temperature clamping ----

    #[test]
    fn test_clamp_temperature_in_range() {
        assert_eq!(clamp_temperature(0.7), Some(0.7));
        assert_eq!(clamp_temperature(0.0), Some(0.0));
        assert_eq!(clamp_temperature(2.0), Some(2.0));
    }

    #[test]
    fn test_clamp_temperature_out_of_range() {
        assert_eq!(clamp_temperature(-1.0), Some(0.0));
        assert_eq!(clamp_temperature(3.5), Some(2.0));
    }

    #[test]
    fn test_clamp_temperature_nan() {
        assert_eq!(clamp_temperature(f32::NAN), None);
    }

    // ---- Text operations ----

    #[test]
    fn test_analyze_text_passthrough() {
        let parts = analyze_text("¿qué es Rust?");
        assert_eq!(parts.len(), 1);
        assert_eq!(text_of(&parts, 0), "¿qué es Rust?");
    }

    #[test]
    fn test_sentiment_simple_wording() {
        let parts = sentiment("me encanta este producto", false);
        let text = text_of(&parts, 0);
        assert!(text.starts_with("Analiza el sentimiento del siguiente texto."));
        assert!(text.contains("\"positivo\", \"negativo\" o \"neutral\""));
        assert!(text.contains("me encanta este producto"));
    }

    #[test]
    fn test_sentiment_detailed_wording() {
        let parts = sentiment("regular", true);
        let text = text_of(&parts, 0);
        assert!(text.contains("Score de confianza (0-100)"));
        assert!(text.contains("Emociones detectadas"));
        assert!(text.contains("Responde en formato JSON."));
    }

    #[test]
    fn test_translate_auto_source() {
        let parts = translate("Hello world", "español", "auto");
        assert_eq!(
            text_of(&parts, 0),
            "Traduce el siguiente texto a español:\n\nHello world"
        );
    }

    #[test]
    fn test_translate_explicit_source() {
        let parts = translate("Hello", "francés", "inglés");
        assert_eq!(
            text_of(&parts, 0),
            "Traduce el siguiente texto de inglés a francés:\n\nHello"
        );
    }

    #[test]
    fn test_summarize_lengths() {
        let short = summarize("texto", SummaryLength::Short, false);
        assert!(text_of(&short, 0).contains("muy breve (2-3 oraciones)"));

        let medium = summarize("texto", SummaryLength::Medium, false);
        assert!(text_of(&medium, 0).contains("moderado (1 párrafo)"));

        let long = summarize("texto", SummaryLength::Long, false);
        assert!(text_of(&long, 0).contains("detallado (2-3 párrafos)"));
    }

    #[test]
    fn test_summarize_bullet_format() {
        let bullets = summarize("texto", SummaryLength::Medium, true);
        assert!(text_of(&bullets, 0).contains("en formato de puntos clave"));

        let prose = summarize("texto", SummaryLength::Medium, false);
        assert!(text_of(&prose, 0).contains("en formato de párrafo"));
    }

    #[test]
    fn test_grammar_check_wording() {
        let parts = grammar_check("ola ke ase", "español");
        let text = text_of(&parts, 0);
        assert!(text.starts_with("Revisa el siguiente texto en español"));
        assert!(text.contains("\"texto_corregido\", \"errores\", \"sugerencias\""));
        assert!(text.contains("ola ke ase"));
    }

    // ---- Chat ----

    #[test]
    fn test_chat_orders_history_then_message() {
        let mut session = ConversationSession::new();
        session.append_user("hola");
        session.append_assistant("¡hola!");
        let history = session.history();

        let parts = chat(&history, "¿cómo estás?");
        assert_eq!(parts.len(), 3);
        assert_eq!(text_of(&parts, 0), "hola");
        assert_eq!(text_of(&parts, 1), "¡hola!");
        assert_eq!(text_of(&parts, 2), "¿cómo estás?");
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[test]
    fn test_chat_empty_history() {
        let parts = chat(&[], "primer mensaje");
        assert_eq!(parts.len(), 1);
        assert_eq!(text_of(&parts, 0), "primer mensaje");
    }

    // ---- Images ----

    #[test]
    fn test_analyze_image_default_prompt() {
        let image = FilePayload::new(vec![1, 2, 3], "image/png");
        let parts = analyze_image(&image, None);
        assert_eq!(parts.len(), 2);
        assert_eq!(text_of(&parts, 0), "Describe esta imagen en detalle");
        assert_eq!(image_mime(&parts, 1), "image/png");
    }

    #[test]
    fn test_analyze_image_custom_prompt() {
        let image = FilePayload::new(vec![1], "image/jpeg");
        let parts = analyze_image(&image, Some("¿Cuántas personas hay?"));
        assert_eq!(text_of(&parts, 0), "¿Cuántas personas hay?");
    }

    #[test]
    fn test_compare_images_order_and_default() {
        let first = FilePayload::new(vec![1], "image/png");
        let second = FilePayload::new(vec![2], "image/jpeg");
        let parts = compare_images(&first, &second, None);
        assert_eq!(parts.len(), 3);
        assert_eq!(
            text_of(&parts, 0),
            "Compara estas dos imágenes y describe sus diferencias y similitudes"
        );
        assert_eq!(image_mime(&parts, 1), "image/png");
        assert_eq!(image_mime(&parts, 2), "image/jpeg");
    }

    // ---- Documents and tabular data ----

    #[test]
    fn test_analyze_document_content_precedes_instruction() {
        let parts = analyze_document("contenido del informe", AnalysisKind::Summary);
        assert_eq!(parts.len(), 2);
        assert!(text_of(&parts, 0).starts_with("Documento:\n"));
        assert!(text_of(&parts, 0).contains("contenido del informe"));
        assert_eq!(
            text_of(&parts, 1),
            "Resume el documento anterior de forma concisa."
        );
    }

    #[test]
    fn test_analyze_document_kinds() {
        let kp = analyze_document("x", AnalysisKind::KeyPoints);
        assert!(text_of(&kp, 1).contains("puntos clave"));

        let sent = analyze_document("x", AnalysisKind::Sentiment);
        assert!(text_of(&sent, 1).contains("sentimiento y tono"));

        let ent = analyze_document("x", AnalysisKind::Entities);
        assert!(text_of(&ent, 1).contains("personas, lugares, organizaciones"));
    }

    #[test]
    fn test_analyze_csv_data_precedes_question() {
        let parts = analyze_csv("a,b\n1,2", "¿cuál es la suma de b?");
        assert_eq!(parts.len(), 2);
        assert_eq!(text_of(&parts, 0), "Datos:\na,b\n1,2");
        assert!(text_of(&parts, 1).ends_with("¿cuál es la suma de b?"));
    }

    // ---- Content generation ----

    #[test]
    fn test_generate_content_prefixes() {
        let story = generate_content("un dragón", ContentKind::Story);
        assert_eq!(
            text_of(&story, 0),
            "Escribe una historia creativa sobre: un dragón"
        );

        let poem = generate_content("el mar", ContentKind::Poem);
        assert_eq!(text_of(&poem, 0), "Escribe un poema sobre: el mar");

        let article = generate_content("Rust", ContentKind::Article);
        assert_eq!(
            text_of(&article, 0),
            "Escribe un artículo informativo sobre: Rust"
        );

        let code = generate_content("ordenar una lista", ContentKind::Code);
        assert_eq!(text_of(&code, 0), "Genera código para: ordenar una lista");
    }

    #[test]
    fn test_generate_content_general_has_no_prefix() {
        let general = generate_content("lo que quieras", ContentKind::General);
        assert_eq!(text_of(&general, 0), "lo que quieras");
    }
}
