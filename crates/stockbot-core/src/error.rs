//! 봇 전반의 에러 타입.
//!
//! 각 크레이트는 자체 에러 타입을 두고, 사용자에게 보고되는 경계에서
//! `BotError`로 변환합니다.

use thiserror::Error;

/// 핵심 봇 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 시세/뉴스 데이터 에러
    #[error("{0}")]
    Data(String),

    /// 종목을 찾을 수 없음
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// 네트워크 에러
    #[error("Network error: {0}")]
    Network(String),

    /// LLM 호출 에러
    #[error("LLM error: {0}")]
    Llm(String),

    /// 텔레그램 API 에러
    #[error("Telegram error: {0}")]
    Telegram(String),

    /// 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 봇 작업을 위한 Result 타입.
pub type BotResult<T> = Result<T, BotError>;

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_message_is_passed_through() {
        let err = BotError::Data("⚠️ Yahoo data unavailable for FOO.NS".to_string());
        assert_eq!(err.to_string(), "⚠️ Yahoo data unavailable for FOO.NS");
    }
}
