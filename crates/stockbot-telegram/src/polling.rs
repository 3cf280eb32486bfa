//! long polling 업데이트 수신 루프.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::bot_handler::{MarketAssistant, UpdateDispatcher};
use crate::types::TelegramError;

/// 폴링 실패 후 대기 시간.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// `getUpdates`로 업데이트를 수신해 디스패처에 넘깁니다.
///
/// 시작 시 웹훅을 해제하고, 각 업데이트는 별도 태스크에서 처리합니다.
/// `shutdown`이 취소되면 새 업데이트 수신을 멈추고 반환합니다. 처리 중인
/// 업데이트는 [`UpdateDispatcher::drain`]으로 기다립니다.
pub async fn run_polling<A>(
    dispatcher: Arc<UpdateDispatcher<A>>,
    timeout_secs: u64,
    shutdown: CancellationToken,
) where
    A: MarketAssistant + 'static,
{
    let client = dispatcher.client().clone();

    if let Err(e) = client.delete_webhook(false).await {
        warn!(error = %e, "웹훅 해제 실패, polling 계속 진행");
    }

    info!(timeout_secs, "텔레그램 봇 폴링 시작");
    let mut offset = 0i64;

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = client.get_updates(offset, timeout_secs) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    dispatcher.spawn_dispatch(update);
                }
            }
            Err(TelegramError::RateLimited(secs)) => {
                if !pause(Duration::from_secs(secs), &shutdown).await {
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "업데이트 폴링 실패");
                if !pause(ERROR_BACKOFF, &shutdown).await {
                    break;
                }
            }
        }
    }

    info!("텔레그램 봇 폴링 종료");
}

/// 대기 중 종료 신호가 오면 false.
async fn pause(duration: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
