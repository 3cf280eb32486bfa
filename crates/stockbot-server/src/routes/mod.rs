//! HTTP 라우트.
//!
//! # 라우트 구조
//!
//! - `GET /` - 동작 확인 문구
//! - `GET /health` - 헬스 체크 (JSON)
//! - `POST /{bot_token}` - Telegram 웹훅

pub mod health;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use stockbot_telegram::MarketAssistant;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::state::AppState;

pub use health::{health_check, live, HealthResponse, LIVE_MESSAGE};
pub use webhook::{telegram_webhook, SECRET_HEADER};

/// 전체 라우터 생성.
pub fn create_router<A: MarketAssistant + 'static>(state: Arc<AppState<A>>) -> Router {
    Router::new()
        .route("/", get(live))
        .route("/health", get(health_check::<A>))
        .route("/{token}", post(telegram_webhook::<A>))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
}

/// 요청 span.
///
/// 웹훅 경로에 봇 토큰이 들어 있으므로 URI 대신 라우트 패턴만 기록합니다.
fn request_span(request: &Request<Body>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched");

    tracing::debug_span!("request", method = %request.method(), route)
}
