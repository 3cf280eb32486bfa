//! 종목 시세 스냅샷.

use serde::{Deserialize, Serialize};

use super::{format_price, NewsItem, Price};

/// 한 시점의 종목 시세 요약.
///
/// 모든 가격 필드는 선택적이며, 외부 소스가 값을 주지 않으면 `None`으로
/// 남겨 두고 표시 시점에 `N/A`로 렌더링합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 거래소 접미사가 붙은 심볼 (예: "RELIANCE.NS")
    pub symbol: String,
    /// 회사명
    pub name: String,
    /// 거래소 이름
    pub exchange: String,
    /// 업종
    pub industry: String,
    /// 통화 코드
    pub currency: String,
    /// 현재가
    pub current: Option<Price>,
    /// 전일 종가
    pub previous_close: Option<Price>,
    /// 당일 고가
    pub day_high: Option<Price>,
    /// 당일 저가
    pub day_low: Option<Price>,
    /// 52주 최고가
    pub year_high: Option<Price>,
    /// 52주 최저가
    pub year_low: Option<Price>,
}

impl StockSnapshot {
    /// 당일 가격 범위.
    pub fn day_range(&self) -> PriceRange {
        PriceRange::new(self.day_low, self.day_high)
    }

    /// 52주 가격 범위.
    pub fn year_range(&self) -> PriceRange {
        PriceRange::new(self.year_low, self.year_high)
    }

    /// "INR 2850.05" 형태의 현재가 문자열.
    pub fn price_label(&self) -> String {
        format!("{} {}", self.currency, format_price(self.current))
    }
}

/// 저가-고가 범위. `Display`는 "저가 - 고가" 형식입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub low: Option<Price>,
    pub high: Option<Price>,
}

impl PriceRange {
    pub fn new(low: Option<Price>, high: Option<Price>) -> Self {
        Self { low, high }
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", format_price(self.low), format_price(self.high))
    }
}

/// 한 번의 종목 조회 결과 (시세 + 관련 뉴스).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLookup {
    pub snapshot: StockSnapshot,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

impl MarketLookup {
    pub fn new(snapshot: StockSnapshot, news: Vec<NewsItem>) -> Self {
        Self { snapshot, news }
    }
}
