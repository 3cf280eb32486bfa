//! OpenAI 호환 chat-completion 클라이언트.
//!
//! OpenRouter, Hugging Face router 등 `/chat/completions` 엔드포인트를
//! 제공하는 모든 서비스에 사용할 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stockbot_core::ProviderConfig;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};

/// 프롬프트 하나를 받아 답변 하나를 돌려주는 LLM 제공자.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 로그용 제공자 이름.
    fn name(&self) -> &str;

    /// 단일 사용자 메시지로 completion을 요청합니다.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// 단일 제공자용 chat-completion HTTP 클라이언트.
pub struct ChatCompletionClient {
    name: String,
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

impl ChatCompletionClient {
    /// 제공자 설정과 요청 타임아웃으로 클라이언트를 생성합니다.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            name: config.name.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl ChatProvider for ChatCompletionClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(provider = %self.name, model = %self.model, "Requesting chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), "Chat completion rejected");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyResponse(self.name.clone()))
    }
}
