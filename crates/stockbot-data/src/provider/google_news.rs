//! Google News RSS 헤드라인 Provider.
//!
//! `{base}/rss/search?q={회사명} stock {지역}` 피드를 읽어 최신 헤드라인을 반환합니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use stockbot_core::{MarketConfig, NewsItem};
use tracing::debug;

use super::NewsProvider;
use crate::error::{DataError, Result};

/// Google News RSS Provider.
pub struct GoogleNewsProvider {
    client: Client,
    base_url: String,
    region: String,
}

impl GoogleNewsProvider {
    /// 시장 설정으로 Provider를 생성합니다.
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.news_base_url.trim_end_matches('/').to_string(),
            region: config.news_region.clone(),
        })
    }

    /// 검색어 생성 ("Reliance Industries Limited stock India").
    pub fn search_query(&self, company: &str) -> String {
        let company = company.trim();
        if self.region.trim().is_empty() {
            format!("{company} stock")
        } else {
            format!("{company} stock {}", self.region.trim())
        }
    }
}

/// RSS/Atom 본문에서 헤드라인을 추출합니다. 제목이 없는 항목은 건너뜁니다.
pub fn parse_headlines(body: &[u8], limit: usize) -> Result<Vec<NewsItem>> {
    let feed = feed_rs::parser::parse(body)?;

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let headline = entry.title.map(|t| t.content.trim().to_string())?;
            if headline.is_empty() {
                return None;
            }
            let url = entry
                .links
                .into_iter()
                .next()
                .map(|l| l.href)
                .unwrap_or_default();
            Some(NewsItem::new(headline, url))
        })
        .take(limit)
        .collect();

    Ok(items)
}

#[async_trait]
impl NewsProvider for GoogleNewsProvider {
    fn name(&self) -> &str {
        "Google News"
    }

    async fn fetch_headlines(&self, company: &str, limit: usize) -> Result<Vec<NewsItem>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.search_query(company);
        let url = format!("{}/rss/search", self.base_url);
        debug!(query = %query, "Fetching news feed");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::Api {
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let items = parse_headlines(&bytes[..], limit)?;
        debug!(count = items.len(), "News feed parsed");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"Reliance stock India" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>Reliance shares rise after Q2 results</title>
      <link>https://example.com/a</link>
    </item>
    <item>
      <title></title>
      <link>https://example.com/empty</link>
    </item>
    <item>
      <title>Reliance Jio tariff hike boosts outlook</title>
      <link>https://example.com/b</link>
    </item>
    <item>
      <title>Analysts upgrade RIL</title>
      <link>https://example.com/c</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_headlines_skips_untitled_and_limits() {
        let items = parse_headlines(FEED.as_bytes(), 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline, "Reliance shares rise after Q2 results");
        assert_eq!(items[0].url, "https://example.com/a");
        assert_eq!(items[1].headline, "Reliance Jio tariff hike boosts outlook");
    }

    #[test]
    fn test_parse_headlines_rejects_garbage() {
        assert!(parse_headlines(b"not a feed", 5).is_err());
    }

    #[test]
    fn test_search_query() {
        let provider = GoogleNewsProvider::new(&MarketConfig::default()).unwrap();
        assert_eq!(
            provider.search_query(" Tata Consultancy Services "),
            "Tata Consultancy Services stock India"
        );
    }
}
