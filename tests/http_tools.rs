//! HTTP-backed tools against a mock server

mod helpers;

use agent_recipes::tools::news::CrawlNewsTool;
use agent_recipes::tools::research::TavilySearchTool;
use agent_recipes::tools::{registry_for, CrawlerConfig, SearchClientConfig, Tool, ToolError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn tavily_search_posts_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "test-key",
            "query": "ai agents",
            "max_results": 3,
            "include_answer": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Agents shipped everywhere this week.",
            "results": [
                { "title": "Agent frameworks", "url": "https://example.com/a", "content": "..." },
                { "title": "Agent evals", "url": "https://example.com/b", "content": "..." }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = TavilySearchTool::new(
        SearchClientConfig::new()
            .with_endpoint(server.uri())
            .with_api_key("test-key"),
    );
    let out = tool
        .call(&json!({ "query": "ai agents", "max_results": 3 }))
        .await
        .unwrap();

    assert_eq!(out["answer"], "Agents shipped everywhere this week.");
    assert_eq!(out["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn tavily_api_error_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let tool = TavilySearchTool::new(
        SearchClientConfig::new()
            .with_endpoint(server.uri())
            .with_api_key("bad-key"),
    );
    match tool.search("ai", 5).await {
        Err(ToolError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected API error, got {:?}", other),
    }

    // Through the registry the error becomes a value
    let dir = tempfile::tempdir().unwrap();
    let mut settings = helpers::settings(dir.path());
    settings.search = SearchClientConfig::new()
        .with_endpoint(server.uri())
        .with_api_key("bad-key");
    let registry = registry_for("ai-topic-gatherer", &settings).unwrap();
    let out = registry
        .invoke("tavily_search", &json!({ "query": "ai" }))
        .await
        .unwrap();
    assert!(out["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn crawler_reads_hacker_news_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search_by_date"))
        .and(query_param("tags", "story"))
        .and(query_param("query", "LLM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [
                {
                    "objectID": "101",
                    "title": "New open weights LLM",
                    "url": "https://example.com/llm",
                    "created_at": "2026-10-16T08:00:00Z",
                    "points": 240,
                    "num_comments": 88
                },
                {
                    "objectID": "102",
                    "title": "Ask HN: Which LLM do you use?",
                    "url": null,
                    "points": 12,
                    "num_comments": 40
                },
                { "objectID": "103", "title": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let tool = CrawlNewsTool::new(CrawlerConfig::new().with_endpoint(server.uri()));
    let out = tool
        .call(&json!({
            "sources": ["hackernews", "techcrunch"],
            "query": "LLM",
            "max_articles": 10,
            "output_dir": dir.path().to_str().unwrap()
        }))
        .await
        .unwrap();

    assert_eq!(out["count"], 2);
    assert_eq!(out["skipped"], json!(["techcrunch"]));
    assert_eq!(out["articles"][0]["url"], "https://example.com/llm");
    assert_eq!(out["articles"][0]["source"], "Hacker News");
    assert_eq!(
        out["articles"][1]["url"],
        "https://news.ycombinator.com/item?id=102"
    );
    assert!(dir.path().join("articles.json").exists());
}

#[tokio::test]
async fn crawler_stops_at_max_articles() {
    let server = MockServer::start().await;
    let hits: Vec<_> = (0..5)
        .map(|i| json!({ "objectID": i.to_string(), "title": format!("Story {}", i) }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/search_by_date"))
        .and(query_param("hitsPerPage", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": hits })))
        .mount(&server)
        .await;

    let tool = CrawlNewsTool::new(CrawlerConfig::new().with_endpoint(server.uri()));
    let out = tool.call(&json!({ "max_articles": 2 })).await.unwrap();
    assert_eq!(out["count"], 2);
}
