//! Telegram Bot API HTTP 클라이언트.
//!
//! 모든 메서드는 `POST {api_base_url}/bot{token}/{method}` 형태로 호출됩니다.
//! 토큰이 로그에 남지 않도록 네트워크 에러에서는 URL을 제거합니다.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stockbot_core::TelegramSettings;
use tracing::{debug, warn};

use crate::format::{split_message, MAX_MESSAGE_LEN};
use crate::types::{
    ApiResponse, Message, OutgoingMessage, TelegramError, TelegramResult, Update,
};

/// 일반 요청 타임아웃.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// long polling 대기 시간에 더하는 여유 시간.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// 봇이 구독하는 업데이트 종류.
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Telegram Bot API 클라이언트.
pub struct TelegramClient {
    api_base: String,
    client: Client,
}

impl TelegramClient {
    /// 텔레그램 설정으로 클라이언트를 생성합니다.
    pub fn new(settings: &TelegramSettings) -> TelegramResult<Self> {
        if settings.bot_token.trim().is_empty() {
            return Err(TelegramError::InvalidConfig(
                "bot token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TelegramError::Network(e.without_url()))?;

        Ok(Self {
            api_base: format!(
                "{}/bot{}",
                settings.api_base_url.trim_end_matches('/'),
                settings.bot_token
            ),
            client,
        })
    }

    /// Bot API 메서드를 호출하고 `result`를 역직렬화합니다.
    async fn call<P, T>(&self, method: &str, params: &P, timeout: Option<Duration>) -> TelegramResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelegramError::Network(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::Network(e.without_url()))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(TelegramError::Api {
                    code: status.as_u16(),
                    description: body,
                })
            }
        };

        if envelope.ok && status.is_success() {
            return envelope.result.ok_or_else(|| TelegramError::Api {
                code: status.as_u16(),
                description: format!("{method} returned no result"),
            });
        }

        let code = envelope.error_code.unwrap_or(status.as_u16());
        if code == 429 {
            let retry_after = envelope
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(1);
            warn!(method, retry_after, "Telegram rate limit hit");
            return Err(TelegramError::RateLimited(retry_after));
        }

        Err(TelegramError::Api {
            code,
            description: envelope
                .description
                .unwrap_or_else(|| status.to_string()),
        })
    }

    /// `getUpdates` long polling.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> TelegramResult<Vec<Update>> {
        let params = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ALLOWED_UPDATES,
        });

        self.call(
            "getUpdates",
            &params,
            Some(Duration::from_secs(timeout_secs) + POLL_GRACE),
        )
        .await
    }

    /// 메시지 하나를 그대로 전송합니다.
    pub async fn send_message(&self, message: &OutgoingMessage) -> TelegramResult<Message> {
        self.call("sendMessage", message, None).await
    }

    /// 콜백 쿼리에 응답해 버튼의 로딩 표시를 해제합니다.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> TelegramResult<bool> {
        let mut params = serde_json::json!({ "callback_query_id": callback_query_id });
        if let Some(text) = text {
            params["text"] = serde_json::Value::from(text);
        }
        self.call("answerCallbackQuery", &params, None).await
    }

    /// 웹훅 URL을 등록합니다.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> TelegramResult<bool> {
        let mut params = serde_json::json!({
            "url": url,
            "allowed_updates": ALLOWED_UPDATES,
        });
        if let Some(secret) = secret_token {
            params["secret_token"] = serde_json::Value::from(secret);
        }
        self.call("setWebhook", &params, None).await
    }

    /// 등록된 웹훅을 해제합니다. polling 전에 호출해야 합니다.
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> TelegramResult<bool> {
        let params = serde_json::json!({ "drop_pending_updates": drop_pending_updates });
        self.call("deleteWebhook", &params, None).await
    }

    /// 길이 제한을 넘는 텍스트를 나눠서 전송합니다.
    ///
    /// 인라인 키보드는 마지막 조각에만 붙습니다. Telegram이 Markdown 엔티티를
    /// 해석하지 못해 거부하면 해당 조각을 일반 텍스트로 다시 보냅니다.
    pub async fn send_text(&self, message: OutgoingMessage) -> TelegramResult<()> {
        let chunks = split_message(&message.text, MAX_MESSAGE_LEN);
        let last = chunks.len().saturating_sub(1);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let mut part = OutgoingMessage {
                text: chunk,
                reply_markup: None,
                ..message.clone()
            };
            if index == last {
                part.reply_markup = message.reply_markup.clone();
            }

            match self.send_message(&part).await {
                Ok(_) => {}
                Err(e) if e.is_entity_parse_error() && part.parse_mode.is_some() => {
                    warn!(chat_id = part.chat_id, error = %e, "Markdown rejected, sending as plain text");
                    part.parse_mode = None;
                    self.send_message(&part).await?;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(chat_id = message.chat_id, "Message delivered");
        Ok(())
    }
}
