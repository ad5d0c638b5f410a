//! Smoke test - calls the live search and crawl APIs
//!
//! Run with: cargo test --test smoke_test -- --ignored

use agent_recipes::core::Settings;
use agent_recipes::tools::registry_for;
use serde_json::json;

/// Live Tavily search through the topic gatherer's registry
#[tokio::test]
#[ignore] // Requires TAVILY_API_KEY and network
async fn smoke_test_topic_gatherer() {
    let settings = Settings::load(None).expect("settings");
    if settings.search.api_key.is_none() {
        eprintln!("TAVILY_API_KEY not set, skipping");
        return;
    }

    let registry = registry_for("ai-topic-gatherer", &settings).unwrap();
    let today = registry.invoke("today", &json!({})).await.unwrap();
    let query = format!("AI news {}", today["date"].as_str().unwrap());

    let out = registry
        .invoke("tavily_search", &json!({ "query": query, "max_results": 3 }))
        .await
        .unwrap();
    assert!(out.get("error").is_none(), "search failed: {}", out);
    assert!(out["results"].is_array());
}

/// Live Hacker News crawl
#[tokio::test]
#[ignore] // Requires network
async fn smoke_test_news_crawler() {
    let registry = registry_for("ai-news-crawler", &Settings::default()).unwrap();
    let out = registry
        .invoke("crawl_ai_news", &json!({ "max_articles": 5 }))
        .await
        .unwrap();

    assert!(out.get("error").is_none(), "crawl failed: {}", out);
    assert!(out["count"].as_u64().unwrap() <= 5);
}
