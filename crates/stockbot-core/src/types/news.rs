//! 뉴스 헤드라인 타입.

use serde::{Deserialize, Serialize};

/// 뉴스 피드의 단일 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 기사 제목
    pub headline: String,
    /// 기사 링크 (피드에 링크가 없으면 빈 문자열)
    #[serde(default)]
    pub url: String,
}

impl NewsItem {
    pub fn new(headline: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            url: url.into(),
        }
    }
}
