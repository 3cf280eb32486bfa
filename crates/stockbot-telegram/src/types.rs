//! Telegram Bot API 타입 및 에러 정의.
//!
//! 봇이 사용하는 Bot API의 일부만 모델링합니다. 알 수 없는 필드는 무시합니다.

use serde::{Deserialize, Serialize};
use stockbot_core::BotError;

/// 수신 업데이트.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// 메시지 정보.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// 사용자 정보.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// 채팅 정보.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// 인라인 버튼 콜백.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// 인라인 키보드.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// 인라인 키보드 버튼.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    /// 콜백 데이터를 가진 버튼 생성.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
        }
    }
}

/// 메시지 파싱 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ParseMode {
    /// 레거시 Markdown
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// `sendMessage` 요청 본문.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl OutgoingMessage {
    /// 일반 텍스트 메시지 생성.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: false,
            reply_markup: None,
        }
    }

    /// 파싱 모드를 설정합니다.
    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    /// 인라인 키보드를 설정합니다.
    pub fn with_keyboard(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    /// 링크 미리보기 비활성화 여부를 설정합니다.
    pub fn disable_preview(mut self, disabled: bool) -> Self {
        self.disable_web_page_preview = disabled;
        self
    }
}

/// Bot API 응답 봉투.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// 에러 응답의 추가 정보.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// 텔레그램 작업용 Result 타입.
pub type TelegramResult<T> = Result<T, TelegramError>;

/// 텔레그램 에러.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("네트워크 에러: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Bot API 에러 {code}: {description}")]
    Api { code: u16, description: String },

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),
}

impl TelegramError {
    /// Markdown 엔티티 파싱 실패로 거부된 요청인지 확인합니다.
    pub fn is_entity_parse_error(&self) -> bool {
        matches!(
            self,
            TelegramError::Api { code: 400, description }
                if description.to_lowercase().contains("can't parse entities")
        )
    }
}

impl From<TelegramError> for BotError {
    fn from(err: TelegramError) -> Self {
        BotError::Telegram(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_message_update() {
        let json = r#"{
            "update_id": 10001,
            "message": {
                "message_id": 7,
                "from": {"id": 42, "is_bot": false, "first_name": "Asha", "language_code": "en"},
                "chat": {"id": 42, "type": "private", "first_name": "Asha"},
                "date": 1700000000,
                "text": "RELIANCE"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.chat.kind.as_deref(), Some("private"));
        assert_eq!(message.text.as_deref(), Some("RELIANCE"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_deserialize_callback_update() {
        let json = r#"{
            "update_id": 10002,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 42, "is_bot": false, "first_name": "Asha"},
                "message": {"message_id": 8, "chat": {"id": 42, "type": "private"}, "date": 1700000001},
                "chat_instance": "123",
                "data": "summary"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("summary"));
        assert_eq!(query.message.unwrap().chat.id, 42);
    }

    #[test]
    fn test_outgoing_message_skips_empty_fields() {
        let body = serde_json::to_value(OutgoingMessage::text(1, "hi")).unwrap();
        assert!(body.get("parse_mode").is_none());
        assert!(body.get("reply_markup").is_none());

        let body = serde_json::to_value(
            OutgoingMessage::text(1, "*hi*").with_parse_mode(ParseMode::Markdown),
        )
        .unwrap();
        assert_eq!(body["parse_mode"], "Markdown");
        assert_eq!(
            serde_json::to_value(ParseMode::Html).unwrap(),
            serde_json::json!("HTML")
        );
    }

    #[test]
    fn test_entity_parse_error_detection() {
        let err = TelegramError::Api {
            code: 400,
            description: "Bad Request: can't parse entities: Can't find end of the entity".into(),
        };
        assert!(err.is_entity_parse_error());
        assert!(!TelegramError::RateLimited(3).is_entity_parse_error());
    }
}
