//! Yahoo Finance 시세 Provider.
//!
//! # 데이터 소스
//! - `/v8/finance/chart/{symbol}`: 현재가, 전일 종가, 당일/52주 고저, 회사명, 거래소
//! - `/v1/finance/search`: 업종 정보, 회사명 → 심볼 변환
//!
//! # 심볼 형식
//! 접미사가 없는 입력에는 설정된 거래소 접미사(기본 `.NS`, NSE)를 붙입니다.
//! `RELIANCE` → `RELIANCE.NS`, `TCS.BO`는 그대로 사용합니다.
//!
//! ```rust,ignore
//! let provider = YahooQuoteProvider::new(&MarketConfig::default())?;
//! let snapshot = provider.fetch_snapshot("reliance").await?;
//! println!("{} {}", snapshot.symbol, snapshot.price_label());
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use stockbot_core::{price_from_f64, MarketConfig, StockSnapshot, NOT_AVAILABLE};
use tracing::{debug, info, warn};

use super::QuoteProvider;
use crate::error::{DataError, Result};

/// 인도 시장에서 이미 거래소가 지정된 것으로 보는 접미사.
const KNOWN_SUFFIXES: &[&str] = &[".NS", ".BO"];

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 사용자 입력을 Yahoo 심볼로 정규화합니다.
///
/// 심볼에 쓰이지 않는 문자(공백, `?`, `#`, `/` 등)를 제거하고 대문자로 바꾼 뒤,
/// 거래소 접미사가 없으면 `suffix`를 붙입니다. 결과는 URL 경로에 그대로 들어갑니다.
pub fn normalize_symbol(input: &str, suffix: &str) -> String {
    let symbol: String = input
        .chars()
        .filter(|c| is_symbol_char(*c))
        .collect::<String>()
        .to_uppercase();
    let suffix = suffix.to_uppercase();

    let has_suffix = symbol.ends_with(&suffix) || KNOWN_SUFFIXES.iter().any(|s| symbol.ends_with(s));
    if has_suffix || symbol.is_empty() {
        symbol
    } else {
        format!("{symbol}{suffix}")
    }
}

/// Yahoo 심볼 문자 (`M&M.NS`, `^NSEI`, `BAJAJ-AUTO.NS`, `INR=X`).
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '&' | '-' | '^' | '=')
}

// ==================== 응답 타입 ====================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_name: Option<String>,
    #[serde(default)]
    full_exchange_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    regular_market_day_high: Option<f64>,
    #[serde(default)]
    regular_market_day_low: Option<f64>,
    #[serde(default)]
    fifty_two_week_high: Option<f64>,
    #[serde(default)]
    fifty_two_week_low: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: String,
    #[serde(default)]
    quote_type: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

impl SearchQuote {
    fn is_equity(&self) -> bool {
        self.quote_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("EQUITY"))
            .unwrap_or(true)
    }
}

// ==================== Provider ====================

/// Yahoo Finance 시세 Provider.
pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
    exchange_suffix: String,
    default_exchange: String,
    default_currency: String,
}

impl YahooQuoteProvider {
    /// 시장 설정으로 Provider를 생성합니다.
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
            exchange_suffix: config.exchange_suffix.clone(),
            default_exchange: config.default_exchange.clone(),
            default_currency: config.default_currency.clone(),
        })
    }

    /// chart API에서 메타데이터를 조회합니다.
    ///
    /// 현재가가 없는 응답은 `DataError::Unavailable`로 처리합니다.
    async fn fetch_chart(&self, symbol: &str) -> Result<ChartMeta> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!(symbol, "Fetching chart from Yahoo Finance");

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(symbol, status = %response.status(), "Yahoo chart request rejected");
            return Err(DataError::Unavailable(symbol.to_string()));
        }

        let body: ChartResponse = response.json().await?;

        if let Some(error) = body.chart.error {
            debug!(
                symbol,
                code = %error.code,
                description = error.description.as_deref().unwrap_or(""),
                "Yahoo chart error"
            );
            return Err(DataError::Unavailable(symbol.to_string()));
        }

        let meta = body
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| DataError::Unavailable(symbol.to_string()))?;

        if meta.regular_market_price.is_none() {
            return Err(DataError::Unavailable(symbol.to_string()));
        }

        Ok(meta)
    }

    /// search API로 검색어에 해당하는 종목 후보를 조회합니다.
    async fn search(&self, query: &str) -> Result<Vec<SearchQuote>> {
        let url = format!("{}/v1/finance/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("quotesCount", "10"), ("newsCount", "0")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::Api {
                status: response.status().as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.quotes)
    }

    /// 회사명을 설정된 거래소의 심볼로 변환합니다.
    ///
    /// 설정된 거래소 접미사의 주식 종목을 우선하고, 없으면 알려진 인도
    /// 거래소 접미사 종목을 사용합니다.
    async fn resolve_symbol(&self, query: &str) -> Option<String> {
        let quotes = match self.search(query.trim()).await {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!(query, error = %e, "Symbol search failed");
                return None;
            }
        };

        let suffix = self.exchange_suffix.to_uppercase();
        let equities = || {
            quotes
                .iter()
                .filter(|q| q.is_equity() && q.symbol.chars().all(is_symbol_char))
        };

        equities()
            .find(|q| q.symbol.to_uppercase().ends_with(&suffix))
            .or_else(|| {
                equities().find(|q| {
                    let symbol = q.symbol.to_uppercase();
                    KNOWN_SUFFIXES.iter().any(|s| symbol.ends_with(s))
                })
            })
            .map(|q| q.symbol.to_uppercase())
    }

    /// 종목 업종 조회 (실패 시 `N/A`).
    async fn fetch_industry(&self, symbol: &str) -> String {
        match self.search(symbol).await {
            Ok(quotes) => quotes
                .into_iter()
                .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
                .and_then(|q| q.industry)
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            Err(e) => {
                debug!(symbol, error = %e, "Industry lookup failed");
                NOT_AVAILABLE.to_string()
            }
        }
    }

    /// 메타데이터를 스냅샷으로 변환합니다.
    fn to_snapshot(&self, symbol: &str, meta: ChartMeta, industry: String) -> StockSnapshot {
        let symbol = meta.symbol.unwrap_or_else(|| symbol.to_string());
        let name = meta
            .long_name
            .or(meta.short_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| symbol.clone());
        let exchange = meta
            .full_exchange_name
            .or(meta.exchange_name)
            .unwrap_or_else(|| self.default_exchange.clone());

        StockSnapshot {
            symbol,
            name,
            exchange,
            industry,
            currency: meta
                .currency
                .unwrap_or_else(|| self.default_currency.clone()),
            current: meta.regular_market_price.and_then(price_from_f64),
            previous_close: meta
                .chart_previous_close
                .or(meta.previous_close)
                .and_then(price_from_f64),
            day_high: meta.regular_market_day_high.and_then(price_from_f64),
            day_low: meta.regular_market_day_low.and_then(price_from_f64),
            year_high: meta.fifty_two_week_high.and_then(price_from_f64),
            year_low: meta.fifty_two_week_low.and_then(price_from_f64),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_snapshot(&self, ticker: &str) -> Result<StockSnapshot> {
        let symbol = normalize_symbol(ticker, &self.exchange_suffix);
        if symbol.is_empty() {
            return Err(DataError::Unavailable(ticker.to_string()));
        }

        let (symbol, meta) = match self.fetch_chart(&symbol).await {
            Ok(meta) => (symbol, meta),
            Err(DataError::Unavailable(_)) => {
                // 티커가 아니라 회사명일 수 있으므로 검색으로 한 번 더 시도
                let Some(resolved) = self.resolve_symbol(ticker).await.filter(|s| *s != symbol)
                else {
                    return Err(DataError::Unavailable(symbol));
                };
                info!(input = ticker, resolved = %resolved, "Resolved company name to symbol");
                let meta = self.fetch_chart(&resolved).await?;
                (resolved, meta)
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Yahoo chart request failed");
                return Err(e);
            }
        };

        let industry = self.fetch_industry(&symbol).await;
        Ok(self.to_snapshot(&symbol, meta, industry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_default_suffix() {
        assert_eq!(normalize_symbol("reliance", ".NS"), "RELIANCE.NS");
        assert_eq!(normalize_symbol("  TCS ", ".NS"), "TCS.NS");
        assert_eq!(normalize_symbol("tata motors", ".NS"), "TATAMOTORS.NS");
    }

    #[test]
    fn test_normalize_keeps_existing_suffix() {
        assert_eq!(normalize_symbol("INFY.NS", ".NS"), "INFY.NS");
        assert_eq!(normalize_symbol("infy.ns", ".NS"), "INFY.NS");
        assert_eq!(normalize_symbol("SBIN.BO", ".NS"), "SBIN.BO");
    }

    #[test]
    fn test_normalize_custom_suffix() {
        assert_eq!(normalize_symbol("sbin", ".bo"), "SBIN.BO");
    }

    #[test]
    fn test_normalize_strips_url_delimiters() {
        assert_eq!(normalize_symbol("TCS?", ".NS"), "TCS.NS");
        assert_eq!(normalize_symbol("tcs#frag", ".NS"), "TCSFRAG.NS");
        assert_eq!(normalize_symbol("../infy", ".NS"), "..INFY.NS");
        assert_eq!(normalize_symbol("m&m", ".NS"), "M&M.NS");
        assert_eq!(normalize_symbol("bajaj-auto", ".NS"), "BAJAJ-AUTO.NS");
        assert_eq!(normalize_symbol("???", ".NS"), "");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_symbol("   ", ".NS"), "");
    }

    #[test]
    fn test_chart_meta_deserialize() {
        let json = r#"{
            "currency": "INR",
            "symbol": "RELIANCE.NS",
            "exchangeName": "NSI",
            "fullExchangeName": "NSE",
            "regularMarketPrice": 2850.05,
            "fiftyTwoWeekHigh": 3217.9,
            "longName": "Reliance Industries Limited"
        }"#;
        let meta: ChartMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.full_exchange_name.as_deref(), Some("NSE"));
        assert_eq!(meta.regular_market_price, Some(2850.05));
        assert!(meta.fifty_two_week_low.is_none());
    }
}
