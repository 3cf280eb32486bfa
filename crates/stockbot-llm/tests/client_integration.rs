//! chat-completion 클라이언트 통합 테스트 (mockito 서버 사용).

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use stockbot_core::{LlmConfig, ProviderConfig};
use stockbot_llm::{ChatCompletionClient, ChatProvider, LlmError, StockAnalyst};

fn provider(name: &str, base_url: &str, model: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        model: model.to_string(),
        api_key: format!("{name}-key"),
    }
}

fn completion(content: &str) -> String {
    json!({
        "id": "gen-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[tokio::test]
async fn test_complete_sends_bearer_and_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer openrouter-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek/deepseek-r1:free",
            "messages": [{"role": "user", "content": "Analyze TCS"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("  TCS looks strong.  \n"))
        .create_async()
        .await;

    let config = provider(
        "openrouter",
        &format!("{}/v1/", server.url()),
        "deepseek/deepseek-r1:free",
    );
    let client = ChatCompletionClient::new(&config, Duration::from_secs(5)).unwrap();

    let answer = client.complete("Analyze TCS").await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "TCS looks strong.");
    assert_eq!(client.name(), "openrouter");
}

#[tokio::test]
async fn test_complete_non_success_is_api_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let config = provider("openrouter", &format!("{}/v1", server.url()), "m");
    let client = ChatCompletionClient::new(&config, Duration::from_secs(5)).unwrap();

    let err = client.complete("hi").await.unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.to_string().contains("Rate limit exceeded"));
}

#[tokio::test]
async fn test_complete_empty_choices() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let config = provider("huggingface", &format!("{}/v1", server.url()), "m");
    let client = ChatCompletionClient::new(&config, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.complete("hi").await,
        Err(LlmError::EmptyResponse(ref name)) if name == "huggingface"
    ));
}

#[tokio::test]
async fn test_analyst_falls_back_to_second_provider() {
    let mut primary = Server::new_async().await;
    let mut fallback = Server::new_async().await;

    let primary_mock = primary
        .mock("POST", "/api/v1/chat/completions")
        .with_status(502)
        .create_async()
        .await;
    let fallback_mock = fallback
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer huggingface-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "meta-llama/Llama-3.1-8B-Instruct"
        })))
        .with_status(200)
        .with_body(completion("Final verdict: Buy"))
        .expect(1)
        .create_async()
        .await;

    let config = LlmConfig {
        primary: provider(
            "openrouter",
            &format!("{}/api/v1", primary.url()),
            "deepseek/deepseek-r1:free",
        ),
        fallback: provider(
            "huggingface",
            &format!("{}/v1", fallback.url()),
            "meta-llama/Llama-3.1-8B-Instruct",
        ),
        ..LlmConfig::default()
    };
    let analyst = StockAnalyst::from_config(&config).unwrap();

    let lookup: stockbot_core::MarketLookup = serde_json::from_value(json!({
        "snapshot": {
            "symbol": "ITC.NS",
            "name": "ITC Limited",
            "exchange": "NSE",
            "industry": "Tobacco",
            "currency": "INR",
            "current": "431.2",
            "previous_close": null,
            "day_high": null,
            "day_low": null,
            "year_high": null,
            "year_low": null
        }
    }))
    .unwrap();

    assert_eq!(analyst.analyze(&lookup).await, "Final verdict: Buy");
    primary_mock.assert_async().await;
    fallback_mock.assert_async().await;
}

fn chat_config(fallback_url: &str) -> LlmConfig {
    LlmConfig {
        primary: provider("openrouter", "http://127.0.0.1:9/api/v1", "primary-model"),
        fallback: provider("huggingface", fallback_url, "fallback-model"),
        chat_timeout_secs: 5,
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn test_chat_empty_completion_reports_failure() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "fallback-model"})))
        .with_status(200)
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"   "}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let analyst = StockAnalyst::from_config(&chat_config(&format!("{}/v1", server.url()))).unwrap();

    assert_eq!(
        analyst.chat("is it a good time to buy infosys?").await,
        "⚠️ Chat failed: empty completion from huggingface"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_transport_error_reports_failure() {
    // 연결이 거부되는 주소
    let analyst = StockAnalyst::from_config(&chat_config("http://127.0.0.1:9/v1")).unwrap();

    let answer = analyst.chat("what is the repo rate?").await;

    assert!(answer.starts_with("⚠️ Chat failed: "), "{answer}");
    assert!(!answer.contains("Chat API error"));
}
