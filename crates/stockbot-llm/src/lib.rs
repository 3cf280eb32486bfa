//! # StockBot LLM
//!
//! 호스팅된 OpenAI 호환 chat-completion API 연동.
//!
//! - `ChatCompletionClient`: 단일 제공자 HTTP 클라이언트
//! - `ProviderChain`: 순서대로 시도하는 대체(fallback) 체인
//! - `build_analysis_prompt`: 종목 분석 프롬프트 생성
//! - `StockAnalyst`: 종목 분석 / 일반 대화 진입점

pub mod analyst;
pub mod chain;
pub mod client;
pub mod error;
pub mod prompt;

pub use analyst::{StockAnalyst, SUMMARY_UNAVAILABLE};
pub use chain::ProviderChain;
pub use client::{ChatCompletionClient, ChatProvider};
pub use error::{LlmError, LlmResult};
pub use prompt::build_analysis_prompt;
