//! 웹훅 서버 공유 상태.

use std::sync::Arc;
use std::time::Instant;

use stockbot_telegram::{MarketAssistant, UpdateDispatcher};

/// 웹훅 핸들러가 공유하는 상태.
pub struct AppState<A: MarketAssistant> {
    /// 업데이트 디스패처
    pub dispatcher: Arc<UpdateDispatcher<A>>,
    /// 웹훅 경로로 사용되는 봇 토큰
    bot_token: String,
    /// `X-Telegram-Bot-Api-Secret-Token` 헤더 기대값
    webhook_secret: Option<String>,
    pub version: String,
    started_at: Instant,
}

impl<A: MarketAssistant> AppState<A> {
    pub fn new(dispatcher: Arc<UpdateDispatcher<A>>, bot_token: impl Into<String>) -> Self {
        Self {
            dispatcher,
            bot_token: bot_token.into(),
            webhook_secret: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }

    /// 웹훅 시크릿 설정. 빈 문자열은 무시합니다.
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|s| !s.is_empty());
        self
    }

    /// 요청 경로의 토큰이 봇 토큰과 일치하는지 확인합니다.
    pub fn is_bot_token(&self, token: &str) -> bool {
        !self.bot_token.is_empty() && self.bot_token == token
    }

    /// 시크릿 헤더를 검사합니다. 시크릿이 없으면 항상 통과합니다.
    pub fn accepts_secret(&self, header: Option<&str>) -> bool {
        match &self.webhook_secret {
            Some(expected) => header == Some(expected.as_str()),
            None => true,
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
