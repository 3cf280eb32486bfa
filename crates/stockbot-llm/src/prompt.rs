//! 종목 분석 프롬프트.

use stockbot_core::{MarketLookup, NewsItem};

/// 뉴스가 없을 때 프롬프트에 들어가는 문구.
pub const NO_NEWS: &str = "No recent news found.";

/// 뉴스 목록을 "- 제목 (링크)" 줄로 변환합니다.
pub fn news_lines(news: &[NewsItem]) -> String {
    if news.is_empty() {
        return NO_NEWS.to_string();
    }
    news.iter()
        .map(|n| format!("- {} ({})", n.headline, n.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 시세와 뉴스로 전문가 수준의 종목 분석을 요청하는 프롬프트를 만듭니다.
pub fn build_analysis_prompt(lookup: &MarketLookup) -> String {
    let s = &lookup.snapshot;

    format!(
        "Provide a professional, detailed stock analysis for {name} ({symbol}).\n\
         \n\
         Exchange: {exchange}\n\
         Industry: {industry}\n\
         Price: {price}\n\
         Range: {day_range}\n\
         52W Range: {year_range}\n\
         \n\
         Recent News:\n\
         {news}\n\
         \n\
         Include:\n\
         1️⃣ Technical indicators (RSI, EMA, MACD)\n\
         2️⃣ Market sentiment based on news\n\
         3️⃣ Support and resistance levels\n\
         4️⃣ Short-term vs long-term outlook\n\
         5️⃣ Final investment verdict (Buy/Hold/Sell)\n",
        name = s.name,
        symbol = s.symbol,
        exchange = s.exchange,
        industry = s.industry,
        price = s.price_label(),
        day_range = s.day_range(),
        year_range = s.year_range(),
        news = news_lines(&lookup.news),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockbot_core::StockSnapshot;

    fn lookup(news: Vec<NewsItem>) -> MarketLookup {
        MarketLookup::new(
            StockSnapshot {
                symbol: "TCS.NS".to_string(),
                name: "Tata Consultancy Services Limited".to_string(),
                exchange: "NSE".to_string(),
                industry: "Information Technology Services".to_string(),
                currency: "INR".to_string(),
                current: Some(dec!(4012.35)),
                previous_close: Some(dec!(3990)),
                day_high: Some(dec!(4030.1)),
                day_low: Some(dec!(3985.5)),
                year_high: None,
                year_low: None,
            },
            news,
        )
    }

    #[test]
    fn test_prompt_contains_snapshot_fields() {
        let prompt = build_analysis_prompt(&lookup(vec![NewsItem::new(
            "TCS wins mega deal",
            "https://example.com/tcs",
        )]));

        assert!(prompt.starts_with(
            "Provide a professional, detailed stock analysis for Tata Consultancy Services Limited (TCS.NS)."
        ));
        assert!(prompt.contains("Price: INR 4012.35\n"));
        assert!(prompt.contains("Range: 3985.5 - 4030.1\n"));
        assert!(prompt.contains("52W Range: N/A - N/A\n"));
        assert!(prompt.contains("- TCS wins mega deal (https://example.com/tcs)"));
        assert!(prompt.contains("5️⃣ Final investment verdict (Buy/Hold/Sell)"));
    }

    #[test]
    fn test_prompt_without_news() {
        let prompt = build_analysis_prompt(&lookup(Vec::new()));
        assert!(prompt.contains("Recent News:\nNo recent news found.\n"));
    }
}
