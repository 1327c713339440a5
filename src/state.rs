use std::sync::Arc;

use crate::anthropic::VisionModel;
use crate::captioner::Captioner;
use crate::config::Config;
use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub captioner: Captioner,
    pub limiter: Arc<RateLimiter>,
    pub allowed_origins: Vec<String>,
    pub openapi_enabled: bool,
}

impl AppState {
    pub fn from_config(config: &Config, model: Arc<dyn VisionModel>) -> Self {
        Self {
            captioner: Captioner::new(model, config.anthropic_max_tokens),
            limiter: Arc::new(RateLimiter::per_minute(
                config.rate_limit_per_minute,
                config.rate_limit_per_ip,
            )),
            allowed_origins: config.allowed_origins.clone(),
            openapi_enabled: config.openapi_enabled,
        }
    }
}
