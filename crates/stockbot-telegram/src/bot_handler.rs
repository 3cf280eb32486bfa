//! 텔레그램 업데이트 디스패처.
//!
//! 사용자로부터 명령어, 텍스트, 버튼 콜백을 수신하고 처리합니다.
//! - `/start` (`/menu`) - 환영 메시지와 모드 선택 버튼
//! - `/help` - 사용법
//! - `/ping` - 동작 확인
//! - 그 외 텍스트 - 종목 분석 또는 AI 대화

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stockbot_core::{BotResult, MarketLookup};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::client::TelegramClient;
use crate::format::{self, CALLBACK_CHAT, CALLBACK_SUMMARY};
use crate::types::{CallbackQuery, Message, OutgoingMessage, ParseMode, TelegramResult, Update};

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// 환영 메시지와 메뉴
    Start,
    /// 도움말
    Help,
    /// 동작 확인
    Ping,
    /// 알 수 없는 명령어
    Unknown(String),
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    ///
    /// `/`로 시작하지 않으면 `None`을 반환합니다. `/start@my_bot` 처럼
    /// 봇 이름이 붙은 형식도 허용합니다.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;

        let word = body.split_whitespace().next().unwrap_or_default();
        let command = word.split('@').next().unwrap_or_default().to_lowercase();

        Some(match command.as_str() {
            "start" | "menu" => BotCommand::Start,
            "help" => BotCommand::Help,
            "ping" => BotCommand::Ping,
            _ => BotCommand::Unknown(text.to_string()),
        })
    }
}

/// 명령어가 아닌 텍스트의 의도.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextIntent {
    /// 종목명 또는 티커
    Ticker(String),
    /// 자유 질문
    Chat(String),
}

/// 텍스트를 종목 조회 또는 대화로 분류합니다.
///
/// 세 단어 이상이면서 전부 대문자가 아닌 문장은 대화로 봅니다.
pub fn classify_text(text: &str) -> TextIntent {
    let text = text.trim();
    if text.split_whitespace().count() > 2 && !is_all_uppercase(text) {
        TextIntent::Chat(text.to_string())
    } else {
        TextIntent::Ticker(text.to_string())
    }
}

/// 대소문자가 있는 문자가 하나 이상 있고 소문자가 없으면 true.
fn is_all_uppercase(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// 인라인 버튼 콜백 동작.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Summary,
    Chat,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            CALLBACK_SUMMARY => CallbackAction::Summary,
            CALLBACK_CHAT => CallbackAction::Chat,
            other => CallbackAction::Unknown(other.to_string()),
        }
    }
}

/// 시세 조회와 AI 응답을 제공하는 백엔드.
///
/// 디스패처는 이 trait을 통해서만 데이터/LLM 계층에 접근합니다.
#[async_trait]
pub trait MarketAssistant: Send + Sync {
    /// 티커(또는 회사명)로 시세와 뉴스를 조회합니다.
    async fn lookup(&self, ticker: &str) -> BotResult<MarketLookup>;

    /// 조회 결과에 대한 AI 요약. 실패 시 안내 문구를 반환합니다.
    async fn summarize(&self, lookup: &MarketLookup) -> String;

    /// 자유 질문에 대한 AI 답변. 실패 시 안내 문구를 반환합니다.
    async fn chat(&self, query: &str) -> String;
}

/// 텔레그램 업데이트 디스패처.
///
/// 웹훅과 polling 모두 [`UpdateDispatcher::dispatch`]로 업데이트를 넘깁니다.
pub struct UpdateDispatcher<A: MarketAssistant> {
    client: Arc<TelegramClient>,
    assistant: Arc<A>,
    /// 허용된 채팅 ID 목록 (비어 있으면 모두 허용)
    allowed_chat_ids: Vec<i64>,
    /// 백그라운드에서 처리 중인 업데이트
    tasks: TaskTracker,
}

impl<A: MarketAssistant> UpdateDispatcher<A> {
    /// 새 디스패처 생성.
    pub fn new(client: Arc<TelegramClient>, assistant: Arc<A>) -> Self {
        Self {
            client,
            assistant,
            allowed_chat_ids: Vec::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// 허용 채팅 ID 설정.
    pub fn with_allowed_chat_ids(mut self, chat_ids: Vec<i64>) -> Self {
        self.allowed_chat_ids = chat_ids;
        self
    }

    pub fn client(&self) -> &Arc<TelegramClient> {
        &self.client
    }

    /// 채팅 ID가 허용 목록에 있는지 확인합니다.
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chat_ids.is_empty() || self.allowed_chat_ids.contains(&chat_id)
    }

    /// 업데이트를 백그라운드 태스크에서 처리합니다.
    ///
    /// 종료 시 [`drain`](Self::drain)으로 처리 중인 태스크를 기다립니다.
    pub fn spawn_dispatch(self: &Arc<Self>, update: Update)
    where
        A: 'static,
    {
        let dispatcher = Arc::clone(self);
        self.tasks.spawn(async move {
            dispatcher.dispatch(update).await;
        });
    }

    /// 처리 중인 업데이트 수.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// 처리 중인 업데이트가 끝날 때까지 최대 `timeout` 동안 기다립니다.
    ///
    /// 모두 끝나면 `true`, 시간 초과면 `false`를 반환합니다.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tasks.close();

        let pending = self.tasks.len();
        if pending > 0 {
            info!(pending, "처리 중인 업데이트 완료 대기");
        }

        match tokio::time::timeout(timeout, self.tasks.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(pending = self.tasks.len(), "업데이트 완료 대기 시간 초과");
                false
            }
        }
    }

    /// 업데이트 하나를 처리합니다. 에러는 로그로만 남깁니다.
    #[instrument(skip_all, fields(update_id = update.update_id))]
    pub async fn dispatch(&self, update: Update) {
        if let Err(e) = self.handle_update(update).await {
            error!(error = %e, "업데이트 처리 실패");
        }
    }

    async fn handle_update(&self, update: Update) -> TelegramResult<()> {
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }

        match update.message {
            Some(message) => self.handle_message(message).await,
            None => {
                debug!("처리할 내용이 없는 업데이트");
                Ok(())
            }
        }
    }

    async fn handle_message(&self, message: Message) -> TelegramResult<()> {
        let chat_id = message.chat.id;

        if !self.is_allowed(chat_id) {
            warn!(chat_id, "허용되지 않은 채팅 ID에서 메시지 수신");
            return Ok(());
        }

        let Some(text) = message.text else {
            return Ok(());
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(command) = BotCommand::parse(text) {
            debug!(chat_id, ?command, "명령어 수신");
            return self.handle_command(chat_id, command).await;
        }

        match classify_text(text) {
            TextIntent::Ticker(ticker) => self.handle_ticker(chat_id, &ticker).await,
            TextIntent::Chat(query) => self.handle_chat(chat_id, &query).await,
        }
    }

    async fn handle_command(&self, chat_id: i64, command: BotCommand) -> TelegramResult<()> {
        let message = match command {
            BotCommand::Start => OutgoingMessage::text(chat_id, format::WELCOME)
                .with_parse_mode(ParseMode::Markdown)
                .with_keyboard(format::welcome_keyboard()),
            BotCommand::Ping => OutgoingMessage::text(chat_id, format::ALIVE),
            BotCommand::Help | BotCommand::Unknown(_) => {
                OutgoingMessage::text(chat_id, format::HELP).with_parse_mode(ParseMode::Markdown)
            }
        };
        self.client.send_text(message).await
    }

    async fn handle_callback(&self, query: CallbackQuery) -> TelegramResult<()> {
        // 버튼의 로딩 표시를 먼저 해제
        if let Err(e) = self.client.answer_callback_query(&query.id, None).await {
            warn!(error = %e, "콜백 응답 실패");
        }

        let Some(chat_id) = query.message.as_ref().map(|m| m.chat.id) else {
            debug!("메시지가 없는 콜백");
            return Ok(());
        };

        if !self.is_allowed(chat_id) {
            warn!(chat_id, "허용되지 않은 채팅 ID에서 콜백 수신");
            return Ok(());
        }

        let text = match CallbackAction::parse(query.data.as_deref().unwrap_or_default()) {
            CallbackAction::Summary => format::SUMMARY_PROMPT,
            CallbackAction::Chat => format::CHAT_MODE,
            CallbackAction::Unknown(data) => {
                debug!(chat_id, data = %data, "알 수 없는 콜백 데이터");
                return Ok(());
            }
        };

        self.client
            .send_text(OutgoingMessage::text(chat_id, text))
            .await
    }

    #[instrument(skip(self))]
    async fn handle_ticker(&self, chat_id: i64, ticker: &str) -> TelegramResult<()> {
        let ticker = ticker.to_uppercase();

        let lookup = match self.assistant.lookup(&ticker).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, "종목 조회 실패");
                return self
                    .client
                    .send_text(OutgoingMessage::text(chat_id, format::format_error(&e)))
                    .await;
            }
        };

        self.client
            .send_text(OutgoingMessage::text(chat_id, format::ANALYZING))
            .await?;

        let summary = self.assistant.summarize(&lookup).await;
        let report = format::format_stock_report(&lookup, &summary);

        info!(symbol = %lookup.snapshot.symbol, "종목 리포트 전송");
        self.client
            .send_text(
                OutgoingMessage::text(chat_id, report)
                    .with_parse_mode(ParseMode::Markdown)
                    .disable_preview(false),
            )
            .await
    }

    async fn handle_chat(&self, chat_id: i64, query: &str) -> TelegramResult<()> {
        self.client
            .send_text(OutgoingMessage::text(chat_id, format::THINKING))
            .await?;

        let answer = self.assistant.chat(query).await;
        self.client
            .send_text(OutgoingMessage::text(chat_id, answer).with_parse_mode(ParseMode::Markdown))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_command() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/menu"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("  /START  "), Some(BotCommand::Start));
        assert_eq!(
            BotCommand::parse("/start@indian_stock_bot"),
            Some(BotCommand::Start)
        );
    }

    #[test]
    fn test_parse_help_and_ping() {
        assert_eq!(BotCommand::parse("/help"), Some(BotCommand::Help));
        assert_eq!(BotCommand::parse("/ping extra"), Some(BotCommand::Ping));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            BotCommand::parse("/portfolio"),
            Some(BotCommand::Unknown("/portfolio".to_string()))
        );
        assert_eq!(BotCommand::parse("RELIANCE"), None);
    }

    #[test]
    fn test_classify_ticker() {
        assert_eq!(classify_text("reliance"), TextIntent::Ticker("reliance".into()));
        assert_eq!(classify_text("tata motors"), TextIntent::Ticker("tata motors".into()));
        assert_eq!(
            classify_text("HDFC BANK LTD"),
            TextIntent::Ticker("HDFC BANK LTD".into())
        );
    }

    #[test]
    fn test_classify_chat() {
        assert_eq!(
            classify_text("  what is nifty 50?  "),
            TextIntent::Chat("what is nifty 50?".into())
        );
        assert_eq!(
            classify_text("Is HDFC a buy"),
            TextIntent::Chat("Is HDFC a buy".into())
        );
    }

    #[test]
    fn test_uppercase_requires_cased_character() {
        assert!(is_all_uppercase("TCS 2024"));
        assert!(!is_all_uppercase("1 2 3"));
        assert_eq!(classify_text("1 2 3"), TextIntent::Chat("1 2 3".into()));
    }

    #[test]
    fn test_callback_action() {
        assert_eq!(CallbackAction::parse("summary"), CallbackAction::Summary);
        assert_eq!(CallbackAction::parse("chat"), CallbackAction::Chat);
        assert_eq!(
            CallbackAction::parse("other"),
            CallbackAction::Unknown("other".into())
        );
    }
}
