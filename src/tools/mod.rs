//! Recipe tools and per-recipe registries

pub mod args;
pub mod capture;
pub mod client;
pub mod feedback;
pub mod news;
pub mod publishing;
pub mod registry;
pub mod research;
pub mod script;
pub mod show;
pub mod text;
pub mod video;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::Settings;
pub use client::{CrawlerConfig, SearchClientConfig};
pub use registry::ToolRegistry;

/// Error types for tool calls
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("{0} not set")]
    MissingCredential(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Error-shaped value returned to callers instead of the error itself
    pub fn to_payload(&self) -> Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// A callable registered under a string name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    /// Call the tool with a JSON object of arguments
    async fn call(&self, args: &Value) -> Result<Value, ToolError>;
}

type ToolFn = dyn Fn(&Value) -> Result<Value, ToolError> + Send + Sync;

/// Tool backed by a synchronous closure
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    func: Arc<ToolFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, args: &Value) -> Result<Value, ToolError> {
        (self.func)(args)
    }
}

/// Write `value` as pretty JSON to `dir/file`, creating `dir` as needed
pub(crate) fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    file: &str,
    value: &T,
) -> Result<PathBuf, ToolError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file);
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path)
}

pub(crate) fn write_text(dir: &Path, file: &str, contents: &str) -> Result<PathBuf, ToolError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Templates that ship a tool registry
pub const KNOWN_TEMPLATES: &[&str] = &[
    "ai-ab-hook-tester",
    "ai-angle-generator",
    "ai-brief-generator",
    "ai-broll-builder",
    "ai-comment-miner",
    "ai-content-calendar",
    "ai-context-enricher",
    "ai-cta-generator",
    "ai-daily-news-show",
    "ai-fact-checker",
    "ai-hashtag-optimizer",
    "ai-hook-generator",
    "ai-news-capture-pack",
    "ai-news-crawler",
    "ai-news-deduper",
    "ai-performance-analyzer",
    "ai-post-copy-generator",
    "ai-publisher-pack",
    "ai-screen-recorder",
    "ai-screenshot-capture",
    "ai-script-writer",
    "ai-signal-ranker",
    "ai-topic-gatherer",
    "ai-video-merger",
    "ai-voiceover-generator",
    "shorts-generator",
];

/// Build the tool registry of a template, `None` for templates without tools
pub fn registry_for(template: &str, settings: &Settings) -> Option<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    match template {
        "ai-news-crawler" => news::register_crawler(&mut registry, settings),
        "ai-news-deduper" => news::register_deduper(&mut registry),
        "ai-signal-ranker" => news::register_ranker(&mut registry),
        "ai-context-enricher" => news::register_enricher(&mut registry),
        "ai-brief-generator" => news::register_brief(&mut registry),

        "ai-script-writer" => script::register_writer(&mut registry),
        "ai-angle-generator" => script::register_angles(&mut registry),
        "ai-hook-generator" => script::register_hooks(&mut registry),
        "ai-cta-generator" => script::register_cta(&mut registry),
        "ai-fact-checker" => script::register_fact_checker(&mut registry),

        "ai-broll-builder" => video::register_broll(&mut registry),
        "ai-voiceover-generator" => video::register_voiceover(&mut registry),
        "ai-video-merger" => video::register_merger(&mut registry),
        "shorts-generator" => video::register_shorts(&mut registry),

        "ai-screenshot-capture" => capture::register_screenshots(&mut registry),
        "ai-screen-recorder" => capture::register_recorder(&mut registry),
        "ai-news-capture-pack" => capture::register_pack(&mut registry, settings),

        "ai-publisher-pack" => publishing::register_publisher(&mut registry),
        "ai-content-calendar" => publishing::register_calendar(&mut registry),
        "ai-post-copy-generator" => publishing::register_post_copy(&mut registry),
        "ai-hashtag-optimizer" => publishing::register_hashtags(&mut registry),

        "ai-performance-analyzer" => feedback::register_analyzer(&mut registry),
        "ai-comment-miner" => feedback::register_comment_miner(&mut registry),
        "ai-ab-hook-tester" => feedback::register_ab_tester(&mut registry),

        "ai-daily-news-show" => show::register(&mut registry, settings),
        "ai-topic-gatherer" => research::register(&mut registry, settings),

        _ => return None,
    }
    Some(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_template_has_tools() {
        let settings = Settings::default();
        for template in KNOWN_TEMPLATES {
            let registry = registry_for(template, &settings)
                .unwrap_or_else(|| panic!("{} should have a registry", template));
            assert!(!registry.is_empty(), "{} registry is empty", template);
        }
    }

    #[test]
    fn test_unknown_template_has_no_registry() {
        assert!(registry_for("not-a-template", &Settings::default()).is_none());
    }

    #[test]
    fn test_error_payload_shape() {
        let err = ToolError::MissingCredential("TAVILY_API_KEY");
        assert_eq!(
            err.to_payload(),
            serde_json::json!({ "error": "TAVILY_API_KEY not set" })
        );
    }

    #[tokio::test]
    async fn test_fn_tool_calls_closure() {
        let tool = FnTool::new("echo", "Echo arguments", |args| Ok(args.clone()));
        let out = tool.call(&serde_json::json!({ "a": 1 })).await.unwrap();
        assert_eq!(out["a"], 1);
        assert_eq!(tool.name(), "echo");
    }
}
