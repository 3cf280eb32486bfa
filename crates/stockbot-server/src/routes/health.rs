//! 헬스 체크 endpoint.
//!
//! 호스팅 플랫폼의 상태 확인용입니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use stockbot_telegram::MarketAssistant;

use crate::state::AppState;

/// 루트 경로 응답 문구.
pub const LIVE_MESSAGE: &str = "✅ Indian Stock AI Bot is live!";

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// 서버 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: u64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
}

/// GET /
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, LIVE_MESSAGE)
}

/// GET /health
pub async fn health_check<A: MarketAssistant + 'static>(
    State(state): State<Arc<AppState<A>>>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
