//! 종목 분석 및 일반 대화 진입점.
//!
//! 두 기능 모두 실패를 에러로 돌려주지 않고 사용자에게 보여줄 안내 문구로
//! 바꿔서 반환합니다.

use std::sync::Arc;
use std::time::Duration;

use stockbot_core::{LlmConfig, MarketLookup};
use tracing::{instrument, warn};

use crate::chain::ProviderChain;
use crate::client::{ChatCompletionClient, ChatProvider};
use crate::error::{LlmError, LlmResult};
use crate::prompt::build_analysis_prompt;

/// 모든 분석 제공자가 실패했을 때의 안내 문구.
pub const SUMMARY_UNAVAILABLE: &str = "⚠️ AI summary currently unavailable.";

/// LLM 기반 종목 분석가.
pub struct StockAnalyst {
    analysis: Arc<dyn ChatProvider>,
    chat: Arc<dyn ChatProvider>,
}

impl StockAnalyst {
    /// 분석용 제공자(보통 [`ProviderChain`])와 대화용 제공자로 생성합니다.
    pub fn new(analysis: Arc<dyn ChatProvider>, chat: Arc<dyn ChatProvider>) -> Self {
        Self { analysis, chat }
    }

    /// 설정에서 생성합니다.
    ///
    /// 분석은 primary → fallback 순서로 시도하고, 일반 대화는 fallback
    /// 제공자만 사용합니다.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let analysis_timeout = Duration::from_secs(config.analysis_timeout_secs);
        let chat_timeout = Duration::from_secs(config.chat_timeout_secs);

        let chain = ProviderChain::new()
            .with_provider(Arc::new(ChatCompletionClient::new(
                &config.primary,
                analysis_timeout,
            )?))
            .with_provider(Arc::new(ChatCompletionClient::new(
                &config.fallback,
                analysis_timeout,
            )?));
        let chat = ChatCompletionClient::new(&config.fallback, chat_timeout)?;

        Ok(Self::new(Arc::new(chain), Arc::new(chat)))
    }

    /// 종목 분석 요약을 생성합니다.
    #[instrument(skip_all, fields(symbol = %lookup.snapshot.symbol))]
    pub async fn analyze(&self, lookup: &MarketLookup) -> String {
        let prompt = build_analysis_prompt(lookup);
        match self.analysis.complete(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "AI summary unavailable");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }

    /// 자유 질문에 답합니다.
    pub async fn chat(&self, query: &str) -> String {
        match self.chat.complete(query).await {
            Ok(answer) => answer,
            Err(LlmError::Api { status, .. }) => format!("⚠️ Chat API error: {status}"),
            Err(e) => {
                warn!(provider = self.chat.name(), error = %e, "Chat failed");
                format!("⚠️ Chat failed: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::StubProvider;
    use rust_decimal_macros::dec;
    use stockbot_core::StockSnapshot;

    fn lookup() -> MarketLookup {
        MarketLookup::new(
            StockSnapshot {
                symbol: "SBIN.NS".to_string(),
                name: "State Bank of India".to_string(),
                exchange: "NSE".to_string(),
                industry: "Banks - Regional".to_string(),
                currency: "INR".to_string(),
                current: Some(dec!(812.4)),
                previous_close: None,
                day_high: None,
                day_low: None,
                year_high: None,
                year_low: None,
            },
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_analyze_returns_summary() {
        let analyst = StockAnalyst::new(
            StubProvider::ok("analysis", "Verdict: Hold"),
            StubProvider::ok("chat", "unused"),
        );
        assert_eq!(analyst.analyze(&lookup()).await, "Verdict: Hold");
    }

    #[tokio::test]
    async fn test_analyze_unavailable() {
        let analyst = StockAnalyst::new(
            Arc::new(ProviderChain::new().with_provider(StubProvider::failing("p", 500))),
            StubProvider::ok("chat", "unused"),
        );
        assert_eq!(analyst.analyze(&lookup()).await, SUMMARY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chat_api_error_reports_status() {
        let analyst = StockAnalyst::new(
            StubProvider::ok("analysis", "unused"),
            StubProvider::failing("chat", 503),
        );
        assert_eq!(analyst.chat("what is nifty?").await, "⚠️ Chat API error: 503");
    }

    #[tokio::test]
    async fn test_chat_answer() {
        let analyst = StockAnalyst::new(
            StubProvider::ok("analysis", "unused"),
            StubProvider::ok("chat", "Nifty 50 is an index."),
        );
        assert_eq!(analyst.chat("what is nifty?").await, "Nifty 50 is an index.");
    }
}
