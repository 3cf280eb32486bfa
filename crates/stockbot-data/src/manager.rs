//! 종목 조회 서비스.
//!
//! 시세 Provider와 뉴스 Provider를 묶어 한 번의 종목 조회를 수행합니다.
//! 시세 조회 실패는 에러로 전파하지만 뉴스 조회 실패는 빈 목록으로 대체합니다.

use std::sync::Arc;

use stockbot_core::MarketLookup;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::provider::{NewsProvider, QuoteProvider};

/// 시세 + 뉴스 조회 서비스.
pub struct MarketDataService {
    quotes: Arc<dyn QuoteProvider>,
    news: Arc<dyn NewsProvider>,
    news_limit: usize,
}

impl MarketDataService {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
        news_limit: usize,
    ) -> Self {
        Self {
            quotes,
            news,
            news_limit,
        }
    }

    /// 종목 시세와 관련 뉴스를 조회합니다.
    #[instrument(skip(self), fields(quotes = self.quotes.name(), news = self.news.name()))]
    pub async fn lookup(&self, ticker: &str) -> Result<MarketLookup> {
        let snapshot = self.quotes.fetch_snapshot(ticker).await?;

        let news = match self
            .news
            .fetch_headlines(&snapshot.name, self.news_limit)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol = %snapshot.symbol, error = %e, "News fetch failed, continuing without news");
                Vec::new()
            }
        };

        info!(
            symbol = %snapshot.symbol,
            headlines = news.len(),
            "Market lookup completed"
        );

        Ok(MarketLookup::new(snapshot, news))
    }
}
