//! 실제 데이터/LLM 계층을 사용하는 `MarketAssistant` 구현.

use std::sync::Arc;

use async_trait::async_trait;
use stockbot_core::{AppConfig, BotResult, MarketLookup};
use stockbot_data::{GoogleNewsProvider, MarketDataService, YahooQuoteProvider};
use stockbot_llm::StockAnalyst;
use stockbot_telegram::MarketAssistant;

/// Yahoo Finance + Google News + LLM 분석가.
pub struct LiveAssistant {
    market: MarketDataService,
    analyst: StockAnalyst,
}

impl LiveAssistant {
    pub fn new(market: MarketDataService, analyst: StockAnalyst) -> Self {
        Self { market, analyst }
    }

    /// 설정에서 Provider와 분석가를 구성합니다.
    pub fn from_config(config: &AppConfig) -> BotResult<Self> {
        let quotes = YahooQuoteProvider::new(&config.market)?;
        let news = GoogleNewsProvider::new(&config.market)?;
        let market = MarketDataService::new(
            Arc::new(quotes),
            Arc::new(news),
            config.market.news_limit,
        );
        let analyst = StockAnalyst::from_config(&config.llm)?;

        Ok(Self::new(market, analyst))
    }
}

#[async_trait]
impl MarketAssistant for LiveAssistant {
    async fn lookup(&self, ticker: &str) -> BotResult<MarketLookup> {
        Ok(self.market.lookup(ticker).await?)
    }

    async fn summarize(&self, lookup: &MarketLookup) -> String {
        self.analyst.analyze(lookup).await
    }

    async fn chat(&self, query: &str) -> String {
        self.analyst.chat(query).await
    }
}
