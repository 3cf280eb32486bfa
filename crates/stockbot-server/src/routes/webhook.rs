//! Telegram 웹훅 endpoint.
//!
//! `POST /{bot_token}`으로 들어온 업데이트를 백그라운드 태스크에서 처리하고
//! 즉시 `OK`를 반환합니다. Telegram은 응답이 늦으면 같은 업데이트를 재전송합니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use stockbot_telegram::{MarketAssistant, Update};
use tracing::{debug, warn};

use crate::state::AppState;

/// Telegram이 웹훅 시크릿을 담아 보내는 헤더.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /{token}
pub async fn telegram_webhook<A: MarketAssistant + 'static>(
    State(state): State<Arc<AppState<A>>>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if !state.is_bot_token(&token) {
        return (StatusCode::NOT_FOUND, "Not Found");
    }

    let secret = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !state.accepts_secret(secret) {
        warn!("웹훅 시크릿 불일치");
        return (StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "웹훅 업데이트 파싱 실패");
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    debug!(update_id = update.update_id, "웹훅 업데이트 수신");

    state.dispatcher.spawn_dispatch(update);

    (StatusCode::OK, "OK")
}
