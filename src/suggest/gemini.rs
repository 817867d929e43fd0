use async_trait::async_trait;
use serde_json::{json, Value};

use super::{SuggestError, SuggestionModel};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Google Generative Language `generateContent` client with JSON-mode output.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl SuggestionModel for GeminiModel {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value, SuggestError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });
        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuggestError::Model(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(SuggestError::Model(format!("{status}: {detail}")));
        }

        let payload: Value = res.json().await.map_err(|e| SuggestError::Model(e.to_string()))?;
        answer_text(&payload)
            .ok_or_else(|| SuggestError::MalformedResponse("response has no candidate text".into()))
            .and_then(|text| {
                serde_json::from_str(text).map_err(|e| SuggestError::MalformedResponse(e.to_string()))
            })
    }
}

fn answer_text(payload: &Value) -> Option<&str> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}
