use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Domain types ---

/// One upload as it arrives at the analyze endpoint. Never persisted.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: Vec<u8>,
    pub content_type: String,
    pub vibe: Option<String>,
    pub language: Option<String>,
    pub hints: Option<String>,
}

/// Parsed model output. Only built from JSON that deserialized cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisResult {
    pub quote: String,
    pub mood: String,
    pub hashtags: Vec<String>,
    #[serde(rename = "musickeywords", default)]
    pub music_keywords: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub quote: String,
    pub mood: String,
    pub hashtags: Vec<String>,
}

impl From<AnalysisResult> for AnalyzeResponse {
    // musicKeywords only fed the music lookup, which is switched off
    fn from(result: AnalysisResult) -> Self {
        Self {
            quote: result.quote,
            mood: result.mood,
            hashtags: result.hashtags,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[schema(value_type = String, example = "VALIDATION_ERROR")]
    pub code: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(value_type = String, example = "ok")]
    pub status: &'static str,
    #[schema(value_type = String)]
    pub version: &'static str,
}

// --- Anthropic Messages API types ---

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub stream: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestContent {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseContent>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}
