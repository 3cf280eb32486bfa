//! 데이터 모듈 오류 타입.

use stockbot_core::BotError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 요청 실패
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 해당 심볼의 시세가 없음
    #[error("⚠️ Yahoo data unavailable for {0}")]
    Unavailable(String),

    /// 상위 API가 성공이 아닌 상태 코드를 반환
    #[error("API error: HTTP {status}")]
    Api { status: u16 },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 뉴스 피드 파싱 오류
    #[error("Feed error: {0}")]
    FeedError(String),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<feed_rs::parser::ParseFeedError> for DataError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        DataError::FeedError(err.to_string())
    }
}

impl From<DataError> for BotError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Http(e) => BotError::Network(e.to_string()),
            other => BotError::Data(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
