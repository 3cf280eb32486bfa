//! 주식 요약 봇 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 Telegram 웹훅 서버
//! - 실제 데이터/LLM 계층을 묶는 [`LiveAssistant`]
//!
//! # 모듈 구성
//!
//! - [`state`]: 웹훅 공유 상태 (AppState)
//! - [`routes`]: HTTP 엔드포인트
//! - [`assistant`]: `MarketAssistant` 구현

pub mod assistant;
pub mod routes;
pub mod state;

pub use assistant::LiveAssistant;
pub use routes::create_router;
pub use state::AppState;
