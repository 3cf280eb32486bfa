//! 제공자 대체 체인.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::ChatProvider;
use crate::error::{LlmError, LlmResult};

/// 등록된 순서대로 제공자를 시도하고 첫 성공 결과를 반환합니다.
///
/// 실패한 제공자는 재시도하지 않습니다.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ChatProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 제공자를 체인 끝에 추가합니다.
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

#[async_trait]
impl ChatProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.complete(prompt).await {
                Ok(answer) => {
                    info!(provider = provider.name(), "Chat completion succeeded");
                    return Ok(answer);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "⚠️ Provider failed, trying next");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(LlmError::AllProvidersFailed(failures))
    }
}
