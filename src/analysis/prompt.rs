use serde_json::{json, Value};

use super::wire::{Content, GenerateRequest, GenerationConfig, GoogleSearch, Part, Tool};
use crate::ingest::UploadedFile;

pub const SYSTEM_INSTRUCTION: &str = r#"You are the Remedy Check reviewer, an expert in both modern clinical medicine (pharmacology and internal medicine) and traditional medicine systems such as Ayurveda, Unani and Siddha. You review viral health claims shown in videos and images precisely and without inventing facts.

Multimodal review:
1. Visual: identify the ingredients, how the remedy is prepared, and the dosage form.
2. Audio and on-screen text: transcribe the exact health claims and flag "miracle" or "cure" language.

Return one JSON object with exactly these fields:
- ingredients.identified: list of ingredient names
- ingredients.visualEvidence: what in the media confirmed them
- claim: summary of the viral claim
- realityCheck.traditionalPerspective: what classical texts say about the remedy
- realityCheck.modernScientificView: clinical trial data or medical consensus, found with search
- realityCheck.theGap: where the viral content exaggerates
- verdict.safetyRating: one of "SAFE", "USE CAUTION", "DANGEROUS"
- verdict.riskLevel: explanation of the risks
- multilingualSummary.english: two-sentence summary in English
- multilingualSummary.local: two-sentence summary in the local language most relevant to the content

Always state: "This is a safety verification, not a prescription. Consult a doctor before trying any remedy."
Be respectful to tradition and firm on scientific facts."#;

pub const ANALYSIS_PROMPT: &str =
    "Analyze this health remedy or claim. Use search to find scientific evidence for or against it.";

pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Strict output schema, in the model API's OpenAPI subset.
pub fn response_schema() -> Value {
    let string = || json!({ "type": "STRING" });
    json!({
        "type": "OBJECT",
        "properties": {
            "ingredients": {
                "type": "OBJECT",
                "properties": {
                    "identified": { "type": "ARRAY", "items": string() },
                    "visualEvidence": string()
                },
                "required": ["identified", "visualEvidence"]
            },
            "claim": string(),
            "realityCheck": {
                "type": "OBJECT",
                "properties": {
                    "traditionalPerspective": string(),
                    "modernScientificView": string(),
                    "theGap": string()
                },
                "required": ["traditionalPerspective", "modernScientificView", "theGap"]
            },
            "verdict": {
                "type": "OBJECT",
                "properties": {
                    "safetyRating": {
                        "type": "STRING",
                        "enum": ["SAFE", "USE CAUTION", "DANGEROUS"]
                    },
                    "riskLevel": string()
                },
                "required": ["safetyRating", "riskLevel"]
            },
            "multilingualSummary": {
                "type": "OBJECT",
                "properties": {
                    "english": string(),
                    "local": string()
                },
                "required": ["english", "local"]
            }
        },
        "required": ["ingredients", "claim", "realityCheck", "verdict", "multilingualSummary"]
    })
}

/// Assemble the full model request for one uploaded file.
pub fn build_request(file: &UploadedFile, enable_search: bool) -> GenerateRequest {
    let tools = if enable_search {
        vec![Tool {
            google_search: GoogleSearch::default(),
        }]
    } else {
        Vec::new()
    };

    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::text(SYSTEM_INSTRUCTION)],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::inline(file.mime_type(), file.encoding()),
                Part::text(ANALYSIS_PROMPT),
            ],
        }],
        tools,
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: response_schema(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FileIngestor;

    #[test]
    fn request_inlines_payload_and_enables_search() {
        let file = FileIngestor::default()
            .ingest_bytes(vec![1, 2, 3], "image/jpeg", "kadha.jpg")
            .unwrap();
        let request = build_request(&file, true);

        let user = &request.contents[0];
        let blob = user.parts[0].inline_data.as_ref().unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(blob.data, file.encoding());
        assert_eq!(user.parts[1].text.as_deref(), Some(ANALYSIS_PROMPT));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.generation_config.response_mime_type, "application/json");
    }

    #[test]
    fn search_tool_can_be_disabled() {
        let file = FileIngestor::default()
            .ingest_bytes(vec![1], "image/png", "x.png")
            .unwrap();
        assert!(build_request(&file, false).tools.is_empty());
    }

    #[test]
    fn schema_requires_every_top_level_section() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            ["ingredients", "claim", "realityCheck", "verdict", "multilingualSummary"]
        );
        assert_eq!(
            schema["properties"]["verdict"]["properties"]["safetyRating"]["enum"][1],
            "USE CAUTION"
        );
    }
}
