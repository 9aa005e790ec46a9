use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat content payload for requests and candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Value>,
}

impl Chat {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![serde_json::json!({ "text": text.into() })],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[allow(non_snake_case)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responseMimeType: Option<String>,
}

/// `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[allow(non_snake_case)]
pub struct GenerateContentRequest {
    pub contents: Vec<Chat>,
    pub generationConfig: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: impl Into<String>, json_output: bool) -> Self {
        Self {
            contents: vec![Chat::user_text(prompt)],
            generationConfig: GenerationConfig {
                responseMimeType: json_output.then(|| "application/json".to_string()),
            },
        }
    }
}

/// AiStudio candidate wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct Candidate {
    pub content: Option<Chat>,
    /// Kept open: new finish reasons must not break decoding.
    pub finishReason: Option<String>,
}

/// AiStudio-compatible response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usageMetadata: Value,
    #[serde(default)]
    pub modelVersion: String,
    pub promptFeedback: Option<Value>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
