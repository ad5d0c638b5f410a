//! Topic gathering tools: date provider and web search

use crate::core::Settings;
use crate::tools::{
    args,
    client::{http_client, SearchClientConfig, SEARCH_API_KEY_ENV},
    Tool, ToolError, ToolRegistry,
};
use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

pub fn register(registry: &mut ToolRegistry, settings: &Settings) {
    registry
        .register_fn("today", "Get the current date in YYYY-MM-DD format", |_| {
            Ok(json!({ "date": Local::now().format("%Y-%m-%d").to_string() }))
        })
        .register(TavilySearchTool::new(settings.search.clone()));
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
}

/// AI-powered web search through the Tavily API
pub struct TavilySearchTool {
    client: reqwest::Client,
    config: SearchClientConfig,
}

impl TavilySearchTool {
    pub fn new(config: SearchClientConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
        }
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ToolError::MissingCredential(SEARCH_API_KEY_ENV))?;

        let url = format!("{}/search", self.config.endpoint.trim_end_matches('/'));
        let request = SearchRequest {
            api_key,
            query,
            search_depth: &self.config.search_depth,
            max_results,
            include_answer: true,
        };
        debug!("Searching '{}' (max {} results)", query, max_results);

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let results: Value = response.json().await?;
        info!(
            "Search for '{}' returned {} results",
            query,
            results["results"].as_array().map_or(0, |r| r.len())
        );
        Ok(results)
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "AI-powered web search returning an answer and sources"
    }

    async fn call(&self, args: &Value) -> Result<Value, ToolError> {
        let query = args::required_str(args, "query")?;
        let max_results = args::usize_or(args, "max_results", 5)?;
        self.search(query, max_results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key() {
        let tool = TavilySearchTool::new(SearchClientConfig::new());
        let err = tool.call(&json!({ "query": "ai news" })).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential("TAVILY_API_KEY")));
    }

    #[tokio::test]
    async fn test_requires_query() {
        let tool = TavilySearchTool::new(SearchClientConfig::new().with_api_key("key"));
        assert!(matches!(
            tool.call(&json!({})).await,
            Err(ToolError::MissingArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_today_format() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, &Settings::default());
        let out = registry.invoke("today", &json!({})).await.unwrap();
        let date = out["date"].as_str().unwrap();
        assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        assert_eq!(registry.names(), vec!["today", "tavily_search"]);
    }
}
