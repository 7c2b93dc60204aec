//! Full five-step runs against stub providers

mod common;

use agent_stock::{
    AnalysisSession, AnalysisState, Credentials, MemorySink, OutputFormat, RunOutcome,
    StockAnalysisEngine, StockConfig,
};
use agent_llm::Role;
use axum::http::StatusCode;
use common::{Stub, chart_reply, gemini_reply, serve};
use serde_json::json;

struct Providers {
    quote: Stub,
    news: Stub,
    model: Stub,
}

async fn providers(news_reply: serde_json::Value) -> Providers {
    Providers {
        quote: serve(StatusCode::OK, chart_reply("ACME", 100.0, 90.0)).await,
        news: serve(StatusCode::OK, news_reply).await,
        model: serve(StatusCode::OK, gemini_reply("OK")).await,
    }
}

fn one_article() -> serde_json::Value {
    json!({
        "results": [{ "title": "ACME soars", "url": "https://example.com/a" }]
    })
}

fn engine(providers: &Providers, credentials: &Credentials) -> StockAnalysisEngine {
    let config = StockConfig::builder()
        .quote_api_base(&providers.quote.base)
        .news_api_base(&providers.news.base)
        .model_api_base(&providers.model.base)
        .build()
        .unwrap();
    StockAnalysisEngine::from_config(&config, credentials, OutputFormat::Html).unwrap()
}

fn credentials(model_key: Option<&str>) -> Credentials {
    Credentials {
        quote_key: None,
        news_key: Some("exa-key".to_string()),
        model_key: model_key.map(str::to_string),
    }
}

#[tokio::test]
async fn acme_scenario() {
    let providers = providers(one_article()).await;
    let credentials = credentials(Some("gem-key"));
    let engine = engine(&providers, &credentials);

    let mut session = AnalysisSession::new("ACME", credentials);
    let mut sink = MemorySink::new();
    let outcome = engine.run(&mut session, &mut sink).await;

    assert_eq!(outcome, RunOutcome::Completed);

    let steps = sink.steps();
    let content = |title: &str| {
        steps
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.content.clone())
            .unwrap()
    };
    assert_eq!(content("Stock Data"), "ACME: $100.00 (+10.00, 11.11%)");
    assert_eq!(content("Price Analysis"), "OK");
    assert_eq!(content("Final Analysis"), "OK");
    assert_eq!(content("Recommendation"), "OK");

    let news = content("Recent News");
    assert!(news.contains("<b>ACME soars</b>"));
    assert!(news.contains(">example.com</a>"));

    let conversation = session.conversation().messages();
    assert_eq!(conversation.len(), 3);
    assert_eq!(conversation[0].role, Role::Assistant);
    assert_eq!(conversation[0].content, "OK");
    assert_eq!(conversation[1].content, "News data:\n- ACME soars (example.com)");
    assert_eq!(conversation[2].content, "Provide a trading recommendation for ACME.");

    assert_eq!(providers.quote.count(), 1);
    assert_eq!(providers.news.count(), 1);
    assert_eq!(providers.news.requests()[0].api_key.as_deref(), Some("exa-key"));

    let model_calls = providers.model.requests();
    assert_eq!(model_calls.len(), 3);
    assert_eq!(model_calls[0].api_key.as_deref(), Some("gem-key"));
    assert_eq!(
        model_calls[2].body["contents"][0]["parts"][0]["text"],
        "SYSTEM: You are a financial analyst AI powered by Gemini.\n\n\
         ASSISTANT: OK\n\n\
         USER: News data:\n- ACME soars (example.com)\n\n\
         USER: Provide a trading recommendation for ACME."
    );

    assert_eq!(sink.loading_toggles(true), 1);
    assert_eq!(sink.loading_toggles(false), 1);
    assert_eq!(session.state(), AnalysisState::Idle);
}

#[tokio::test]
async fn news_without_results_still_completes() {
    let providers = providers(json!({"results": []})).await;
    let credentials = credentials(Some("gem-key"));
    let engine = engine(&providers, &credentials);

    let mut session = AnalysisSession::new("ACME", credentials);
    let mut sink = MemorySink::new();
    let outcome = engine.run(&mut session, &mut sink).await;

    assert!(outcome.is_completed());
    let steps = sink.steps();
    let news_error = steps.iter().find(|s| s.title == "News Error").unwrap();
    assert_eq!(news_error.content, "No news articles found");
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(providers.model.count(), 3);
}

#[tokio::test]
async fn missing_model_key_fails_before_any_model_request() {
    let providers = providers(one_article()).await;
    let credentials = credentials(None);
    let engine = engine(&providers, &credentials);

    let mut session = AnalysisSession::new("ACME", credentials);
    let mut sink = MemorySink::new();
    let outcome = engine.run(&mut session, &mut sink).await;

    assert_eq!(outcome, RunOutcome::Failed("Gemini API key not set".to_string()));
    let steps = sink.steps();
    assert_eq!(steps.last().unwrap().content, "Analysis failed: Gemini API key not set");
    assert_eq!(providers.model.count(), 0);
    assert_eq!(providers.news.count(), 0);
    assert_eq!(sink.loading_toggles(false), 1);
}

#[tokio::test]
async fn quote_outage_ends_the_run() {
    let providers = Providers {
        quote: serve(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await,
        news: serve(StatusCode::OK, one_article()).await,
        model: serve(StatusCode::OK, gemini_reply("OK")).await,
    };
    let credentials = credentials(Some("gem-key"));
    let engine = engine(&providers, &credentials);

    let mut session = AnalysisSession::new("ACME", credentials);
    let mut sink = MemorySink::new();
    let outcome = engine.run(&mut session, &mut sink).await;

    assert!(matches!(outcome, RunOutcome::QuoteFailed(_)));
    assert_eq!(sink.titles(), vec!["Step 1: Price Data", "Error"]);
    assert_eq!(providers.news.count(), 0);
    assert_eq!(providers.model.count(), 0);
}
