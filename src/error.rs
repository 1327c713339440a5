use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::captioner::AnalyzeError;
use crate::models::ErrorBody;

/// Everything the HTTP layer can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Too many requests, try again in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Caption service failed: {0}")]
    Upstream(String),
    #[error("Caption service returned an unreadable response: {0}")]
    UpstreamParse(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) | Self::UpstreamParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::UpstreamParse(_) => "UPSTREAM_PARSE_ERROR",
        }
    }
}

impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Model(e) => Self::Upstream(e.to_string()),
            AnalyzeError::Extract(e) => Self::UpstreamParse(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: self.to_string(),
                code: self.code(),
            }),
        )
            .into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::ModelError;
    use crate::extract::ExtractError;

    #[test]
    fn upstream_failures_keep_distinct_codes() {
        let transport: AppError = AnalyzeError::Model(ModelError::NoText).into();
        let parse: AppError = AnalyzeError::Extract(ExtractError::NoJson).into();

        assert_eq!(transport.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(parse.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.code(), "UPSTREAM_ERROR");
        assert_eq!(parse.code(), "UPSTREAM_PARSE_ERROR");
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
