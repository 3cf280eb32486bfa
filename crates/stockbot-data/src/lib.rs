//! 시세 및 뉴스 데이터 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - Yahoo Finance 시세 Provider (거래소 접미사 정규화, 회사명 검색 대체)
//! - Google News RSS 헤드라인 Provider
//! - 두 Provider를 묶어 한 번의 종목 조회를 수행하는 `MarketDataService`

pub mod error;
pub mod manager;
pub mod provider;

pub use error::{DataError, Result};
pub use manager::MarketDataService;
pub use provider::{
    normalize_symbol, GoogleNewsProvider, NewsProvider, QuoteProvider, YahooQuoteProvider,
};
