//! Schema-guided extraction.
//!
//! Builds an instruction enumerating each schema field with a strict
//! `campo: valor` output directive, then parses the model's reply
//! line-by-line back into an ordered field→value mapping.

use serde::Serialize;

use crate::backend::PromptPart;
use crate::error::AiError;
use crate::request::SchemaField;

/// One extracted field: the schema name and the value found, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: Option<String>,
}

/// Build the extraction prompt: document text first, then the enumerated
/// schema and the output-format directive.
pub fn build_prompt(document_text: &str, schema: &[SchemaField]) -> Vec<PromptPart> {
    let field_list = schema
        .iter()
        .map(|field| format!("- {}: {}", field.name, field.description))
        .collect::<Vec<_>>()
        .join("\n");

    vec![PromptPart::Text(format!(
        "Extrae la siguiente información del texto:\n\n\
         {}\n\n\
         Texto:\n{}\n\n\
         Responde SOLO con una línea por campo, en el formato exacto \"campo: valor\".\n\
         Si un campo no aparece en el texto, omite su línea.",
        field_list, document_text
    ))]
}

/// Parse the model's reply against the schema.
///
/// Each non-empty line matching `<field>: <value>` for a known field name
/// populates that entry; unmatched lines are ignored; fields never addressed
/// map to `None`. A reply with zero parseable matches is a total failure and
/// yields `UnparseableResponse`, so callers can distinguish "no data found"
/// from "model produced unusable output".
pub fn parse_reply(reply: &str, schema: &[SchemaField]) -> Result<Vec<ExtractedField>, AiError> {
    let mut result: Vec<ExtractedField> = schema
        .iter()
        .map(|field| ExtractedField {
            name: field.name.clone(),
            value: None,
        })
        .collect();

    let mut matched = 0usize;
    for line in reply.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if let Some(entry) = result.iter_mut().find(|e| e.name == key) {
            // First match wins; later repeats of the same field are ignored.
            if entry.value.is_none() {
                entry.value = Some(value.to_string());
                matched += 1;
            }
        }
    }

    if matched == 0 {
        return Err(AiError::UnparseableResponse(
            "no recognizable field lines in model reply".to_string(),
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_schema() -> Vec<SchemaField> {
        vec![
            SchemaField {
                name: "paciente".to_string(),
                description: "nombre del paciente".to_string(),
            },
            SchemaField {
                name: "edad".to_string(),
                description: "edad en años".to_string(),
            },
            SchemaField {
                name: "diagnostico".to_string(),
                description: "diagnóstico principal".to_string(),
            },
        ]
    }

    fn prompt_text(parts: &[PromptPart]) -> &str {
        match &parts[0] {
            PromptPart::Text(text) => text,
            PromptPart::Image { .. } => panic!("expected text part"),
        }
    }

    // ---- Prompt construction ----

    #[test]
    fn test_prompt_enumerates_fields_in_order() {
        let parts = build_prompt("historia clínica", &patient_schema());
        let text = prompt_text(&parts);
        assert!(text.contains("- paciente: nombre del paciente"));
        assert!(text.contains("- edad: edad en años"));
        assert!(text.contains("- diagnostico: diagnóstico principal"));

        let p = text.find("- paciente").unwrap();
        let e = text.find("- edad").unwrap();
        let d = text.find("- diagnostico").unwrap();
        assert!(p < e && e < d);
    }

    #[test]
    fn test_prompt_includes_document_and_directive() {
        let parts = build_prompt("historia clínica", &patient_schema());
        let text = prompt_text(&parts);
        assert!(text.contains("Texto:\nhistoria clínica"));
        assert!(text.contains("en el formato exacto \"campo: valor\""));
    }

    // ---- Reply parsing ----

    #[test]
    fn test_parse_partial_reply_missing_field_is_none() {
        let reply = "paciente: Ana\nedad: 34";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].name, "paciente");
        assert_eq!(result[0].value.as_deref(), Some("Ana"));
        assert_eq!(result[1].name, "edad");
        assert_eq!(result[1].value.as_deref(), Some("34"));
        assert_eq!(result[2].name, "diagnostico");
        assert_eq!(result[2].value, None);
    }

    #[test]
    fn test_parse_preserves_schema_order_regardless_of_reply_order() {
        let reply = "diagnostico: gripe\npaciente: Ana";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].name, "paciente");
        assert_eq!(result[1].name, "edad");
        assert_eq!(result[2].name, "diagnostico");
        assert_eq!(result[2].value.as_deref(), Some("gripe"));
    }

    #[test]
    fn test_parse_zero_matches_is_unparseable() {
        let reply = "Lo siento, no puedo ayudar con eso.";
        let result = parse_reply(reply, &patient_schema());
        assert!(matches!(result, Err(AiError::UnparseableResponse(_))));
    }

    #[test]
    fn test_parse_empty_reply_is_unparseable() {
        let result = parse_reply("", &patient_schema());
        assert!(matches!(result, Err(AiError::UnparseableResponse(_))));
    }

    #[test]
    fn test_parse_colon_lines_with_unknown_fields_only_is_unparseable() {
        // Lines parse as key: value but none match the schema.
        let reply = "nombre: Ana\naños: 34";
        let result = parse_reply(reply, &patient_schema());
        assert!(matches!(result, Err(AiError::UnparseableResponse(_))));
    }

    #[test]
    fn test_parse_ignores_unmatched_lines() {
        let reply = "Aquí está la información:\npaciente: Ana\n(fin)";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].value.as_deref(), Some("Ana"));
        assert_eq!(result[1].value, None);
    }

    #[test]
    fn test_parse_first_match_wins() {
        let reply = "paciente: Ana\npaciente: Beatriz";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].value.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_parse_trims_whitespace_around_key_and_value() {
        let reply = "  paciente :   Ana María  ";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].value.as_deref(), Some("Ana María"));
    }

    #[test]
    fn test_parse_value_containing_colon() {
        // split_once keeps everything after the first colon as the value.
        let reply = "diagnostico: gripe: tipo A";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[2].value.as_deref(), Some("gripe: tipo A"));
    }

    #[test]
    fn test_parse_empty_value_counts_as_match() {
        let reply = "paciente:";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].value.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_field_names_are_exact() {
        // "Paciente" (capitalized) is not the schema field "paciente".
        let reply = "Paciente: Ana\nedad: 34";
        let result = parse_reply(reply, &patient_schema()).unwrap();
        assert_eq!(result[0].value, None);
        assert_eq!(result[1].value.as_deref(), Some("34"));
    }
}
