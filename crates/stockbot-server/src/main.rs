//! 인도 주식 AI 요약 봇.
//!
//! # 사용 예시
//!
//! ```bash
//! # 공개 호스트가 있으면 웹훅, 없으면 polling
//! stockbot run
//!
//! # 로컬 개발용 polling
//! stockbot poll
//!
//! # Telegram 없이 한 번만 실행
//! stockbot quote RELIANCE
//! stockbot chat "what moves the nifty 50?"
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stockbot_core::{init_logging, AppConfig, LogConfig, Requirement};
use stockbot_server::{create_router, AppState, LiveAssistant};
use stockbot_telegram::format::{format_error, format_stock_report};
use stockbot_telegram::{run_polling, MarketAssistant, TelegramClient, UpdateDispatcher};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 종료 시 처리 중인 업데이트를 기다리는 최대 시간.
///
/// 분석 요청은 primary와 fallback 타임아웃을 합친 만큼 걸릴 수 있습니다.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Parser)]
#[command(name = "stockbot")]
#[command(about = "Indian stock AI summary bot for Telegram", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 공개 호스트가 설정되어 있으면 웹훅, 아니면 polling으로 실행
    Run,

    /// long polling으로 실행
    Poll,

    /// 웹훅 서버로 실행 (RENDER_EXTERNAL_HOSTNAME 필요)
    Webhook,

    /// 종목 하나를 조회하고 리포트를 출력
    Quote {
        /// 종목명 또는 티커 (예: RELIANCE, TCS, Infosys)
        ticker: String,
    },

    /// AI에게 질문하고 답변을 출력
    Chat {
        /// 질문
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Run => match config.server.public_host.clone() {
            Some(host) => run_webhook(config, host).await,
            None => {
                warn!("⚠️ RENDER_EXTERNAL_HOSTNAME missing, using polling mode");
                run_polling_mode(config).await
            }
        },
        Commands::Poll => run_polling_mode(config).await,
        Commands::Webhook => {
            let host = config
                .server
                .public_host
                .clone()
                .context("webhook mode requires RENDER_EXTERNAL_HOSTNAME")?;
            run_webhook(config, host).await
        }
        Commands::Quote { ticker } => quote(config, &ticker).await,
        Commands::Chat { query } => chat(config, &query.join(" ")).await,
    }
}

/// 텔레그램 클라이언트와 디스패처 구성.
fn build_dispatcher(config: &AppConfig) -> anyhow::Result<Arc<UpdateDispatcher<LiveAssistant>>> {
    config.validate(Requirement::Bot)?;

    let client = Arc::new(TelegramClient::new(&config.telegram)?);
    let assistant = Arc::new(LiveAssistant::from_config(config)?);

    if !config.telegram.allowed_chat_ids.is_empty() {
        info!(
            chats = config.telegram.allowed_chat_ids.len(),
            "Chat allowlist enabled"
        );
    }

    Ok(Arc::new(
        UpdateDispatcher::new(client, assistant)
            .with_allowed_chat_ids(config.telegram.allowed_chat_ids.clone()),
    ))
}

async fn run_polling_mode(config: AppConfig) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(&config)?;

    info!("🚀 Starting Indian Stock AI Bot (polling mode)...");

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown_token.clone()));

    run_polling(
        Arc::clone(&dispatcher),
        config.telegram.poll_timeout_secs,
        shutdown_token,
    )
    .await;

    dispatcher.drain(DRAIN_TIMEOUT).await;
    info!("Bot stopped gracefully");
    Ok(())
}

async fn run_webhook(config: AppConfig, host: String) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(&config)?;
    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "Invalid listen address, check server.host and PORT"
        );
        e
    })?;

    info!("🚀 Starting Indian Stock AI Bot (webhook mode)...");

    let webhook_url = format!("https://{}/{}", host, config.telegram.bot_token);
    dispatcher
        .client()
        .set_webhook(&webhook_url, config.server.webhook_secret.as_deref())
        .await
        .context("failed to register webhook")?;
    info!(%host, "✅ Webhook set");

    let state = AppState::new(Arc::clone(&dispatcher), config.telegram.bot_token.clone())
        .with_webhook_secret(config.server.webhook_secret.clone());
    let app = create_router(Arc::new(state));

    info!(%addr, "Webhook server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(CancellationToken::new()))
        .await?;

    info!(
        in_flight = dispatcher.in_flight(),
        "Server shutdown initiated, waiting for in-flight updates..."
    );
    dispatcher.drain(DRAIN_TIMEOUT).await;

    info!("Server stopped gracefully");
    Ok(())
}

/// 종목 리포트를 한 번 생성해 출력합니다.
async fn quote(config: AppConfig, ticker: &str) -> anyhow::Result<()> {
    config.validate(Requirement::LlmOnly)?;
    let assistant = LiveAssistant::from_config(&config)?;

    match assistant.lookup(&ticker.to_uppercase()).await {
        Ok(lookup) => {
            let summary = assistant.summarize(&lookup).await;
            println!("{}", format_stock_report(&lookup, &summary));
        }
        Err(e) => println!("{}", format_error(&e)),
    }
    Ok(())
}

/// 질문 하나에 대한 답변을 출력합니다.
async fn chat(config: AppConfig, query: &str) -> anyhow::Result<()> {
    config.validate(Requirement::LlmOnly)?;
    let assistant = LiveAssistant::from_config(&config)?;

    println!("{}", assistant.chat(query).await);
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
}
