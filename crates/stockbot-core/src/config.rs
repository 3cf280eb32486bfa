//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤가 우선):
//! 1. 내장 기본값
//! 2. TOML 설정 파일 (없으면 건너뜀)
//! 3. `STOCKBOT__` 접두사 환경 변수 (예: `STOCKBOT__MARKET__NEWS_LIMIT=3`)
//! 4. 배포 환경에서 쓰이는 관례적 환경 변수 (`BOT_TOKEN`, `PORT` 등)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BotError, BotResult};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 텔레그램 봇 설정
    #[serde(default)]
    pub telegram: TelegramSettings,
    /// 시세/뉴스 데이터 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// LLM 제공자 설정
    #[serde(default)]
    pub llm: LlmConfig,
    /// 웹훅 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 텔레그램 봇 설정.
#[derive(Clone, Deserialize, Serialize)]
pub struct TelegramSettings {
    /// @BotFather에서 받은 봇 토큰
    #[serde(default)]
    pub bot_token: String,
    /// Bot API 기본 URL
    #[serde(default = "default_telegram_api_url")]
    pub api_base_url: String,
    /// getUpdates long polling 타임아웃 (초)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// 허용된 채팅 ID 목록 (비어 있으면 모두 허용)
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_telegram_api_url(),
            poll_timeout_secs: default_poll_timeout(),
            allowed_chat_ids: Vec::new(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &redact(&self.bot_token))
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("allowed_chat_ids", &self.allowed_chat_ids)
            .finish()
    }
}

/// 시세/뉴스 데이터 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// 접미사가 없는 티커에 붙일 거래소 접미사
    #[serde(default = "default_exchange_suffix")]
    pub exchange_suffix: String,
    /// 응답에 거래소 정보가 없을 때 사용할 이름
    #[serde(default = "default_exchange")]
    pub default_exchange: String,
    /// 응답에 통화 정보가 없을 때 사용할 통화
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Yahoo Finance API 기본 URL
    #[serde(default = "default_yahoo_url")]
    pub yahoo_base_url: String,
    /// 뉴스 RSS 기본 URL
    #[serde(default = "default_news_url")]
    pub news_base_url: String,
    /// 뉴스 검색어에 덧붙일 지역
    #[serde(default = "default_news_region")]
    pub news_region: String,
    /// 가져올 최대 헤드라인 수
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
    /// 시세/뉴스 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_exchange_suffix() -> String {
    ".NS".to_string()
}
fn default_exchange() -> String {
    "NSE".to_string()
}
fn default_currency() -> String {
    "INR".to_string()
}
fn default_yahoo_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_news_url() -> String {
    "https://news.google.com".to_string()
}
fn default_news_region() -> String {
    "India".to_string()
}
fn default_news_limit() -> usize {
    5
}
fn default_request_timeout() -> u64 {
    20
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            exchange_suffix: default_exchange_suffix(),
            default_exchange: default_exchange(),
            default_currency: default_currency(),
            yahoo_base_url: default_yahoo_url(),
            news_base_url: default_news_url(),
            news_region: default_news_region(),
            news_limit: default_news_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// 단일 OpenAI 호환 chat-completion 제공자 설정.
#[derive(Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// 로그에 표시할 제공자 이름
    pub name: String,
    /// API 기본 URL (`/chat/completions`가 뒤에 붙음)
    pub base_url: String,
    /// 모델 식별자
    pub model: String,
    /// Bearer 토큰
    #[serde(default)]
    pub api_key: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// LLM 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// 종목 분석에 먼저 사용하는 제공자
    #[serde(default = "default_primary_provider")]
    pub primary: ProviderConfig,
    /// 분석 실패 시 대체 제공자이자 일반 대화용 제공자
    #[serde(default = "default_fallback_provider")]
    pub fallback: ProviderConfig,
    /// 종목 분석 요청 타임아웃 (초)
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,
    /// 일반 대화 요청 타임아웃 (초)
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
}

fn default_primary_provider() -> ProviderConfig {
    ProviderConfig {
        name: "openrouter".to_string(),
        base_url: "https://openrouter.ai/api/v1".to_string(),
        model: "deepseek/deepseek-r1:free".to_string(),
        api_key: String::new(),
    }
}
fn default_fallback_provider() -> ProviderConfig {
    ProviderConfig {
        name: "huggingface".to_string(),
        base_url: "https://router.huggingface.co/v1".to_string(),
        model: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
        api_key: String::new(),
    }
}
fn default_analysis_timeout() -> u64 {
    90
}
fn default_chat_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_provider(),
            fallback: default_fallback_provider(),
            analysis_timeout_secs: default_analysis_timeout(),
            chat_timeout_secs: default_chat_timeout(),
        }
    }
}

/// 웹훅 서버 설정.
#[derive(Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    #[serde(default = "default_host")]
    pub host: String,
    /// 리스닝할 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 외부에서 접근 가능한 호스트명 (설정 시 웹훅 모드)
    #[serde(default)]
    pub public_host: Option<String>,
    /// 텔레그램이 `X-Telegram-Bot-Api-Secret-Token` 헤더로 보낼 비밀값
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    10000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_host: None,
            webhook_secret: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("public_host", &self.public_host)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_deref().map(redact),
            )
            .finish()
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 설정 검증 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// 텔레그램 봇 실행 (토큰 + LLM 키 모두 필요)
    Bot,
    /// 로컬 단발 실행 (LLM 키만 필요)
    LlmOnly,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `.env` 파일이 있으면 먼저 읽습니다. `path`가 `None`이면
    /// [`DEFAULT_CONFIG_PATH`]를 시도하며, 파일이 없어도 에러가 아닙니다.
    pub fn load(path: Option<&Path>) -> BotResult<Self> {
        dotenvy::dotenv().ok();

        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("STOCKBOT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_chat_ids"),
            )
            // 관례적 배포 환경 변수
            .set_override_option("telegram.bot_token", env_non_empty("BOT_TOKEN"))?
            .set_override_option("llm.primary.api_key", env_non_empty("OPENROUTER_API_KEY"))?
            .set_override_option("llm.fallback.api_key", env_non_empty("HUGGINGFACE_TOKEN"))?
            .set_override_option("server.public_host", env_non_empty("RENDER_EXTERNAL_HOSTNAME"))?
            .set_override_option("server.webhook_secret", env_non_empty("WEBHOOK_SECRET"))?;

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        if let Some(port) = env_non_empty("PORT") {
            app_config.server.port = port
                .parse()
                .map_err(|_| BotError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(ids) = env_non_empty("ALLOWED_CHAT_IDS") {
            app_config.telegram.allowed_chat_ids = parse_chat_ids(&ids)?;
        }

        Ok(app_config)
    }

    /// 필수 값이 모두 설정되었는지 검증합니다.
    ///
    /// 누락된 항목을 한 번에 모두 보고합니다.
    pub fn validate(&self, requirement: Requirement) -> BotResult<()> {
        let mut missing = Vec::new();

        if requirement == Requirement::Bot && self.telegram.bot_token.trim().is_empty() {
            missing.push("BOT_TOKEN");
        }
        if self.llm.primary.api_key.trim().is_empty() {
            missing.push("OPENROUTER_API_KEY");
        }
        if self.llm.fallback.api_key.trim().is_empty() {
            missing.push("HUGGINGFACE_TOKEN");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BotError::Config(format!(
                "❌ Missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

/// 쉼표로 구분된 채팅 ID 목록 파싱.
pub fn parse_chat_ids(raw: &str) -> BotResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| BotError::Config(format!("invalid chat id in ALLOWED_CHAT_IDS: {s}")))
        })
        .collect()
}

/// 환경 변수를 읽되, 비어 있으면 `None`.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 비밀값의 앞 4자만 남기고 가립니다.
fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}***")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.telegram.bot_token = "123456:ABC".to_string();
        config.llm.primary.api_key = "or-key".to_string();
        config.llm.fallback.api_key = "hf-key".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.market.exchange_suffix, ".NS");
        assert_eq!(config.market.news_limit, 5);
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.llm.primary.model, "deepseek/deepseek-r1:free");
        assert_eq!(config.llm.fallback.model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.llm.analysis_timeout_secs, 90);
        assert_eq!(config.llm.chat_timeout_secs, 60);
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let err = AppConfig::default().validate(Requirement::Bot).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("BOT_TOKEN"));
        assert!(message.contains("OPENROUTER_API_KEY"));
        assert!(message.contains("HUGGINGFACE_TOKEN"));
    }

    #[test]
    fn test_validate_llm_only_skips_bot_token() {
        let mut config = configured();
        config.telegram.bot_token.clear();
        assert!(config.validate(Requirement::LlmOnly).is_ok());
        assert!(config.validate(Requirement::Bot).is_err());
    }

    #[test]
    fn test_parse_chat_ids() {
        assert_eq!(parse_chat_ids("1, -1002, 3").unwrap(), vec![1, -1002, 3]);
        assert!(parse_chat_ids("").unwrap().is_empty());
        assert!(parse_chat_ids("12,abc").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", configured());
        assert!(!debug.contains("123456:ABC"));
        assert!(!debug.contains("hf-key"));
        assert!(debug.contains("1234***"));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockbot.toml");
        std::fs::write(
            &path,
            r#"
[market]
news_limit = 3

[telegram]
poll_timeout_secs = 15

[server]
port = 8080
"#,
        )
        .unwrap();

        // 환경 변수는 프로세스 전역이므로 load 관련 검증은 이 테스트 하나에서만 수행
        std::env::set_var("STOCKBOT__MARKET__NEWS_LIMIT", "7");
        std::env::set_var("STOCKBOT__TELEGRAM__ALLOWED_CHAT_IDS", "5,6");
        std::env::set_var("BOT_TOKEN", "987:XYZ");
        std::env::remove_var("PORT");
        std::env::remove_var("ALLOWED_CHAT_IDS");

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.market.news_limit, 7);
        assert_eq!(config.market.exchange_suffix, ".NS");
        assert_eq!(config.telegram.poll_timeout_secs, 15);
        assert_eq!(config.telegram.bot_token, "987:XYZ");
        assert_eq!(config.telegram.allowed_chat_ids, vec![5, 6]);
        assert_eq!(config.server.port, 8080);

        std::env::set_var("PORT", "9000");
        std::env::set_var("ALLOWED_CHAT_IDS", "-100123, 42");
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.telegram.allowed_chat_ids, vec![-100123, 42]);

        std::env::set_var("PORT", "not-a-port");
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("PORT is not a valid port"));

        for key in [
            "STOCKBOT__MARKET__NEWS_LIMIT",
            "STOCKBOT__TELEGRAM__ALLOWED_CHAT_IDS",
            "BOT_TOKEN",
            "PORT",
            "ALLOWED_CHAT_IDS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap().port(), 10000);
    }
}
