use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const LOCAL_FRONTEND: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub anthropic_base_url: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_ip: bool,
    /// Serve the OpenAPI document at `/openapi.json`. Off unless asked for.
    pub openapi_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key =
            get("ANTHROPIC_API_KEY").ok_or_else(|| anyhow!("ANTHROPIC_API_KEY must be set"))?;

        Ok(Self {
            anthropic_api_key,
            anthropic_model: get("ANTHROPIC_MODEL")
                .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
            anthropic_max_tokens: parse_or(get("ANTHROPIC_MAX_TOKENS"), "ANTHROPIC_MAX_TOKENS", 500)?,
            anthropic_base_url: get("ANTHROPIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            port: parse_or(get("PORT"), "PORT", 3000)?,
            allowed_origins: allowed_origins(get("FRONTEND_URL").as_deref()),
            rate_limit_per_minute: parse_or(
                get("RATE_LIMIT_PER_MINUTE"),
                "RATE_LIMIT_PER_MINUTE",
                10,
            )?,
            rate_limit_per_ip: parse_or(get("RATE_LIMIT_PER_IP"), "RATE_LIMIT_PER_IP", true)?,
            openapi_enabled: parse_or(get("ENABLE_OPENAPI"), "ENABLE_OPENAPI", false)?,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

/// The dev frontend is always allowed; a production URL is allowed under
/// both schemes.
fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins = vec![LOCAL_FRONTEND.to_string()];

    if let Some(url) = frontend_url {
        let url = url.trim().trim_end_matches('/');
        origins.push(url.to_string());
        if let Some(rest) = url.strip_prefix("http://") {
            origins.push(format!("https://{rest}"));
        } else if let Some(rest) = url.strip_prefix("https://") {
            origins.push(format!("http://{rest}"));
        }
    }

    origins.dedup();
    origins
}
