use std::sync::Arc;

use tracing::{info, warn};

use crate::anthropic::{ModelError, VisionModel};
use crate::extract::{extract_result, ExtractError};
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::prompt::{build_prompt, variation_seed};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Prompt, one model call, parse. No retries; any failure fails the request.
#[derive(Clone)]
pub struct Captioner {
    model: Arc<dyn VisionModel>,
    max_tokens: u32,
}

impl Captioner {
    pub fn new(model: Arc<dyn VisionModel>, max_tokens: u32) -> Self {
        Self { model, max_tokens }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalyzeError> {
        let seed = variation_seed();
        let prompt = build_prompt(
            request.vibe.as_deref(),
            request.language.as_deref(),
            request.hints.as_deref(),
            &seed,
        );

        let text = self
            .model
            .send(&request.image, &request.content_type, &prompt, self.max_tokens)
            .await?;

        let result = extract_result(&text).inspect_err(|e| {
            warn!(
                "Unparseable model reply ({}): {}",
                e,
                text.chars().take(300).collect::<String>()
            );
        })?;

        info!(
            "Analysis complete. Mood: {}, Quote length: {}",
            result.mood,
            result.quote.chars().count()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Scripted {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VisionModel for Scripted {
        async fn send(
            &self,
            _image: &[u8],
            _media_type: &str,
            prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, ModelError> {
            self.prompts.lock().push(prompt.to_string());
            self.reply.clone().map_err(|_| ModelError::NoText)
        }
    }

    fn request(vibe: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            image: vec![1, 2, 3],
            content_type: "image/jpeg".to_string(),
            vibe: vibe.map(str::to_string),
            language: Some("es".to_string()),
            hints: None,
        }
    }

    fn captioner(reply: Result<&str, ()>) -> (Captioner, Arc<Scripted>) {
        let model = Arc::new(Scripted {
            reply: reply.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        });
        (Captioner::new(model.clone(), 500), model)
    }

    #[tokio::test]
    async fn parses_the_model_reply() {
        let (captioner, model) = captioner(Ok(
            r##"{"quote":"sol y nada más","mood":"golden","hashtags":["#verano"],"musicKeywords":["indie folk"]}"##,
        ));

        let result = captioner.analyze(&request(Some("happy"))).await.unwrap();
        assert_eq!(result.mood, "golden");
        assert_eq!(result.music_keywords, vec!["indie folk".to_string()]);

        let prompts = model.prompts.lock();
        assert!(prompts[0].contains("'happy'"));
        assert!(prompts[0].contains("entirely in Spanish"));
    }

    #[tokio::test]
    async fn each_call_gets_a_fresh_seed() {
        let (captioner, model) = captioner(Ok(r#"{"quote":"a","mood":"b","hashtags":[]}"#));
        captioner.analyze(&request(None)).await.unwrap();
        captioner.analyze(&request(None)).await.unwrap();

        let prompts = model.prompts.lock();
        assert_ne!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn prose_reply_is_an_extract_error() {
        let (captioner, _) = captioner(Ok("Sorry, I can't describe this photo."));
        let err = captioner.analyze(&request(None)).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Extract(ExtractError::NoJson)));
    }

    #[tokio::test]
    async fn model_failure_is_a_model_error() {
        let (captioner, _) = captioner(Err(()));
        let err = captioner.analyze(&request(None)).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Model(ModelError::NoText)));
    }
}
