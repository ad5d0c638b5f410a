//! Output bundle of the daily news show

use crate::core::Settings;
use crate::tools::{args, text, write_json, write_text, Tool, ToolError, ToolRegistry};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

pub fn register(registry: &mut ToolRegistry, settings: &Settings) {
    registry.register(CreateOutputBundleTool::new(settings.output_dir().join("shows")));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleStatus {
    PendingReview,
    Ready,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowManifest {
    pub bundle_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub status: BundleStatus,
    pub human_approval: bool,
    pub files: Vec<String>,
    pub assets: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Writes the script, brief and manifest of one episode into a dated directory
pub struct CreateOutputBundleTool {
    default_dir: PathBuf,
}

impl CreateOutputBundleTool {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for CreateOutputBundleTool {
    fn name(&self) -> &str {
        "create_output_bundle"
    }

    fn description(&self) -> &str {
        "Create the show output bundle: script, brief and manifest, held for review when approval is on"
    }

    async fn call(&self, args: &Value) -> Result<Value, ToolError> {
        let title = args::required_str(args, "title")?;
        let date = match args::optional_str(args, "date") {
            Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| ToolError::invalid("date", e.to_string()))?,
            None => Local::now().date_naive(),
        };
        let human_approval = args::bool_or(args, "human_approval", true);
        let assets = args::string_list(args, "assets")?;
        let base = args::optional_str(args, "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_dir.clone());
        let dir = base.join(format!("show-{}-{}", date, text::slug(title)));

        let mut files = Vec::new();
        // Scripts arrive either as markdown or as write_script output
        match args.get("script") {
            Some(Value::String(script)) => {
                write_text(&dir, "script.md", script)?;
                files.push("script.md".to_string());
            }
            Some(script) if !script.is_null() => {
                write_json(&dir, "script.json", script)?;
                files.push("script.json".to_string());
            }
            _ => {}
        }
        if let Some(brief) = args::optional_str(args, "brief") {
            write_text(&dir, "brief.md", brief)?;
            files.push("brief.md".to_string());
        }

        let manifest = ShowManifest {
            bundle_id: Uuid::new_v4(),
            title: title.to_string(),
            date,
            status: if human_approval {
                BundleStatus::PendingReview
            } else {
                BundleStatus::Ready
            },
            human_approval,
            files,
            assets,
            created_at: Utc::now(),
        };
        let manifest_path = write_json(&dir, "manifest.json", &manifest)?;
        info!(
            "Created show bundle {} ({:?})",
            dir.display(),
            manifest.status
        );

        let mut result = serde_json::to_value(&manifest)?;
        result["bundle_dir"] = json!(dir.display().to_string());
        result["manifest"] = json!(manifest_path.display().to_string());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bundle_pending_review_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CreateOutputBundleTool::new(dir.path());
        let out = tool
            .call(&json!({
                "title": "AI News Daily",
                "date": "2025-01-06",
                "script": "# Episode\n\nHello.",
                "brief": "- story one",
                "assets": ["broll.mp4"]
            }))
            .await
            .unwrap();

        assert_eq!(out["status"], "pending_review");
        assert_eq!(out["files"], json!(["script.md", "brief.md"]));
        let bundle = dir.path().join("show-2025-01-06-ai-news-daily");
        assert_eq!(out["bundle_dir"], bundle.display().to_string());
        assert!(bundle.join("script.md").exists());
        assert!(bundle.join("brief.md").exists());

        let manifest: Value =
            serde_json::from_str(&std::fs::read_to_string(bundle.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["human_approval"], true);
        assert_eq!(manifest["assets"], json!(["broll.mp4"]));
    }

    #[tokio::test]
    async fn test_bundle_ready_without_approval() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CreateOutputBundleTool::new("unused");
        let out = tool
            .call(&json!({
                "title": "Episode",
                "script": { "format": "youtube_long", "sections": [] },
                "human_approval": false,
                "output_dir": dir.path().to_str().unwrap()
            }))
            .await
            .unwrap();

        assert_eq!(out["status"], "ready");
        assert_eq!(out["files"], json!(["script.json"]));
        assert!(out["bundle_dir"]
            .as_str()
            .unwrap()
            .starts_with(dir.path().to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_bundle_requires_title() {
        let tool = CreateOutputBundleTool::new("unused");
        assert!(tool.call(&json!({ "script": "x" })).await.is_err());
    }
}
