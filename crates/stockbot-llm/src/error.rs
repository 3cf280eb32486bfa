//! LLM 호출 에러 타입.

use stockbot_core::BotError;
use thiserror::Error;

/// LLM 작업용 Result 타입.
pub type LlmResult<T> = Result<T, LlmError>;

/// LLM 에러.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty completion from {0}")]
    EmptyResponse(String),

    #[error("all providers failed: {}", .0.join("; "))]
    AllProvidersFailed(Vec<String>),
}

impl LlmError {
    /// 상위 API가 반환한 HTTP 상태 코드.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<LlmError> for BotError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => BotError::Network(e.to_string()),
            other => BotError::Llm(other.to_string()),
        }
    }
}
