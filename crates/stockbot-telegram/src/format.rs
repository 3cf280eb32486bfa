//! 봇 응답 문구와 메시지 포맷.

use std::fmt::Display;

use stockbot_core::{format_price, MarketLookup, NewsItem};

use crate::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Telegram 메시지 최대 길이(문자 수).
pub const MAX_MESSAGE_LEN: usize = 4096;

/// 콜백 데이터: 종목 요약 모드.
pub const CALLBACK_SUMMARY: &str = "summary";

/// 콜백 데이터: 대화 모드.
pub const CALLBACK_CHAT: &str = "chat";

pub const WELCOME: &str =
    "👋 *Welcome to Indian Stock AI Bot 🇮🇳*\n\nChoose one of the options below:";
pub const SUMMARY_PROMPT: &str = "📈 Send any Indian stock name (e.g. Reliance, TCS, Infosys)";
pub const CHAT_MODE: &str = "💬 Chat mode activated! Type your question freely.";
pub const ALIVE: &str = "✅ Bot is alive!";
pub const ANALYZING: &str = "🧠 Analyzing stock data...";
pub const THINKING: &str = "💬 Thinking...";
pub const HELP: &str = "ℹ️ *How to use this bot*\n\n\
    • Send a stock name or ticker (e.g. `RELIANCE`, `TCS`) for an AI summary\n\
    • Ask a question in a full sentence to chat with the AI\n\n\
    /start - main menu\n\
    /ping - check the bot is running";

/// 뉴스가 없을 때 리포트에 표시되는 문구.
const NO_NEWS: &str = "_No recent news found._";

/// `/start` 메시지의 모드 선택 버튼.
pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::callback(
                "📊 AI Stock Summary",
                CALLBACK_SUMMARY,
            )],
            vec![InlineKeyboardButton::callback("💬 Chat Mode", CALLBACK_CHAT)],
        ],
    }
}

/// 종목 리포트 (레거시 Markdown).
pub fn format_stock_report(lookup: &MarketLookup, summary: &str) -> String {
    let s = &lookup.snapshot;

    let news = if lookup.news.is_empty() {
        NO_NEWS.to_string()
    } else {
        lookup
            .news
            .iter()
            .map(news_bullet)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "*📊 {name} ({symbol})*\n\
         Exchange: {exchange}\n\
         Industry: {industry}\n\n\
         💰 *Current Price:* {price}\n\
         Previous Close: {previous}\n\
         Day Range: {day_range}\n\
         52W Range: {year_range}\n\n\
         📰 *Top News:*\n\
         {news}\n\n\
         💬 *AI Expert Summary:*\n\
         {summary}",
        name = s.name,
        symbol = s.symbol,
        exchange = s.exchange,
        industry = s.industry,
        price = s.price_label(),
        previous = format_price(s.previous_close),
        day_range = s.day_range(),
        year_range = s.year_range(),
    )
}

/// 사용자에게 보여줄 에러 문구.
pub fn format_error(err: &impl Display) -> String {
    format!("❌ Error: {err}")
}

fn news_bullet(item: &NewsItem) -> String {
    let text = link_text(&item.headline);
    if item.url.is_empty() {
        format!("• {text}")
    } else {
        format!("• [{text}]({})", item.url.replace(')', "%29"))
    }
}

/// 링크 텍스트 안에서 Markdown 엔티티를 깨뜨리는 문자를 정리합니다.
fn link_text(headline: &str) -> String {
    headline
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .map(|c| match c {
            '[' => '(',
            ']' => ')',
            other => other,
        })
        .collect()
}

/// 텍스트를 `limit` 문자 이하의 조각으로 나눕니다.
///
/// 가능하면 줄 경계에서 자르고, 한 줄이 `limit`보다 길면 문자 단위로 자릅니다.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 || text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            push_chunk(&mut chunks, &mut current);
            current_len = 0;
        }

        if line_len > limit {
            for ch in line.chars() {
                if current_len == limit {
                    push_chunk(&mut chunks, &mut current);
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }
    push_chunk(&mut chunks, &mut current);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, current: &mut String) {
    let chunk = std::mem::take(current);
    let chunk = chunk.strip_suffix('\n').unwrap_or(&chunk);
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}
