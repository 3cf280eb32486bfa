//! 데이터 Provider 모듈.
//!
//! ## Yahoo Finance
//! - `YahooQuoteProvider`: chart API로 현재가, 당일/52주 범위 조회
//! - search API로 업종 정보와 회사명 → 심볼 변환
//!
//! ## Google News
//! - `GoogleNewsProvider`: 회사명 기반 RSS 검색 헤드라인

pub mod google_news;
pub mod yahoo;

use async_trait::async_trait;
use stockbot_core::{NewsItem, StockSnapshot};

use crate::error::Result;

pub use google_news::GoogleNewsProvider;
pub use yahoo::{normalize_symbol, YahooQuoteProvider};

/// 종목 시세 Provider.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 사용자가 입력한 티커(또는 회사명)의 시세 스냅샷을 조회합니다.
    async fn fetch_snapshot(&self, ticker: &str) -> Result<StockSnapshot>;
}

/// 뉴스 헤드라인 Provider.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 회사 관련 최신 헤드라인을 최대 `limit`개 조회합니다.
    async fn fetch_headlines(&self, company: &str, limit: usize) -> Result<Vec<NewsItem>>;
}
