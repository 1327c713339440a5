use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use tracing::{error, info};

use crate::models::{
    ImageSource, Message, MessagesRequest, MessagesResponse, RequestContent, ResponseContent,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode model response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model returned no text response")]
    NoText,
}

/// Sends one image plus prompt to a multimodal model and returns its text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn send(
        &self,
        image: &[u8],
        media_type: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ModelError>;
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn request_body(
        &self,
        image: &[u8],
        media_type: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            stream: false,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    RequestContent::Image {
                        source: ImageSource {
                            kind: "base64".to_string(),
                            media_type: normalize_media_type(media_type).to_string(),
                            data: general_purpose::STANDARD.encode(image),
                        },
                    },
                    RequestContent::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionModel for AnthropicClient {
    async fn send(
        &self,
        image: &[u8],
        media_type: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ModelError> {
        let request = self.request_body(image, media_type, prompt, max_tokens);

        info!("Sending image to {}...", self.model);

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            error!(
                "Model API error ({}): {}",
                status,
                body.chars().take(500).collect::<String>()
            );
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            info!(
                "Model usage: {} input, {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }

        first_text(parsed)
    }
}

/// Anything outside the three accepted upload types is sent as JPEG.
pub fn normalize_media_type(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "image/png",
        "image/webp" => "image/webp",
        _ => "image/jpeg",
    }
}

fn first_text(response: MessagesResponse) -> Result<String, ModelError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseContent::Text { text } => Some(text),
            ResponseContent::Other => None,
        })
        .ok_or(ModelError::NoText)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicClient {
        AnthropicClient::new(
            Client::new(),
            "sk-test".to_string(),
            "claude-test".to_string(),
            "http://localhost".to_string(),
        )
    }

    #[test]
    fn request_carries_image_then_prompt() {
        let body = client().request_body(b"\x89PNG", "image/png", "write a caption", 500);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-test");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["stream"], false);

        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "iVBORw==");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "write a caption");
    }

    #[test]
    fn unknown_media_type_is_sent_as_jpeg() {
        assert_eq!(normalize_media_type("image/gif"), "image/jpeg");
        assert_eq!(normalize_media_type("image/webp"), "image/webp");
    }

    #[test]
    fn first_text_block_wins() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"hm"},{"type":"text","text":"one"},{"type":"text","text":"two"}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(resp).unwrap(), "one");
    }

    #[test]
    fn no_text_block_is_an_error() {
        let resp: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(first_text(resp), Err(ModelError::NoText)));
    }
}
