//! Capture and screen automation tools

use crate::core::Settings;
use crate::tools::{args, text, video::parse_resolution, write_json, Tool, ToolError, ToolRegistry};
use async_trait::async_trait;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const MAX_FPS: usize = 120;
const MAX_RECORDING_SECONDS: f64 = 600.0;
/// Rough H.264 density used for size estimates
const BITS_PER_PIXEL: f64 = 0.1;

pub fn register_screenshots(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_screenshots",
        "Plan high resolution screenshot captures for a list of pages",
        plan_screenshots,
    );
}

pub fn register_recorder(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_recording",
        "Plan a screen recording: frame budget, size estimate and capture job",
        plan_recording,
    );
}

pub fn register_pack(registry: &mut ToolRegistry, settings: &Settings) {
    registry
        .register_fn(
            "plan_screenshots",
            "Plan high resolution screenshot captures for a list of pages",
            plan_screenshots,
        )
        .register(BundleStoryAssetsTool::new(settings.output_dir().join("capture-packs")));
}

fn quality_arg(args: &Value) -> Result<u8, ToolError> {
    let quality = args::usize_or(args, "quality", 90)?;
    if !(1..=100).contains(&quality) {
        return Err(ToolError::invalid("quality", "must be between 1 and 100"));
    }
    Ok(quality as u8)
}

fn plan_screenshots(args: &Value) -> Result<Value, ToolError> {
    let urls = args::string_list(args, "urls")?;
    if urls.is_empty() {
        return Err(ToolError::MissingArgument("urls".to_string()));
    }
    let (width, height) = parse_resolution("resolution", args::str_or(args, "resolution", "1920x1080"))?;
    let quality = quality_arg(args)?;
    let format = args::str_or(args, "format", "png");
    if format != "png" && format != "jpeg" {
        return Err(ToolError::invalid("format", "expected png or jpeg"));
    }
    let full_page = args::bool_or(args, "full_page", false);

    let jobs: Vec<Value> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            json!({
                "index": i,
                "url": url,
                "file": format!("{:02}-{}.{}", i + 1, text::slug(&text::normalize_url(url)), format),
                "viewport": { "width": width, "height": height },
                "full_page": full_page,
                // png is lossless, quality only applies to jpeg
                "quality": if format == "jpeg" { Some(quality) } else { None },
            })
        })
        .collect();

    Ok(json!({
        "jobs": jobs,
        "count": urls.len(),
        "resolution": format!("{}x{}", width, height),
        "format": format,
    }))
}

fn plan_recording(args: &Value) -> Result<Value, ToolError> {
    let url = args::required_str(args, "url")?;
    let fps = args::usize_or(args, "fps", 30)?;
    if fps == 0 || fps > MAX_FPS {
        return Err(ToolError::invalid("fps", format!("must be between 1 and {}", MAX_FPS)));
    }
    let duration = args::f64_or(args, "duration", 10.0)?;
    if duration <= 0.0 || duration > MAX_RECORDING_SECONDS {
        return Err(ToolError::invalid(
            "duration",
            format!("must be between 0 and {} seconds", MAX_RECORDING_SECONDS),
        ));
    }
    let (width, height) = parse_resolution("resolution", args::str_or(args, "resolution", "1920x1080"))?;

    let total_frames = (fps as f64 * duration).round() as u64;
    let bytes = width as f64 * height as f64 * total_frames as f64 * BITS_PER_PIXEL / 8.0;
    let size_mb = (bytes / 1_000_000.0 * 10.0).round() / 10.0;

    Ok(json!({
        "url": url,
        "fps": fps,
        "duration": duration,
        "resolution": format!("{}x{}", width, height),
        "total_frames": total_frames,
        "estimated_size_mb": size_mb,
        "output_file": format!("{}.mp4", text::slug(&text::normalize_url(url))),
    }))
}

// ---------------------------------------------------------------------------
// Capture pack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct Story {
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    assets: Vec<String>,
}

/// Per-story manifest written into each bundle directory
#[derive(Debug, Clone, Serialize)]
pub struct BundleManifest {
    pub bundle_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub assets: Vec<String>,
    pub created_at: chrono::DateTime<Utc>,
}

/// Bundles the assets of each story into its own directory
pub struct BundleStoryAssetsTool {
    default_dir: PathBuf,
}

impl BundleStoryAssetsTool {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    fn bundle(&self, root: &Path, index: usize, story: Story) -> Result<Value, ToolError> {
        let dir = root.join(format!("{:02}-{}", index + 1, text::slug(&story.title)));
        let mut assets = story.assets;
        if let Some(url) = &story.url {
            // Planned capture for the story page itself
            assets.push(format!("screenshot-{}.png", text::slug(&text::normalize_url(url))));
        }

        let manifest = BundleManifest {
            bundle_id: Uuid::new_v4(),
            title: story.title,
            url: story.url,
            summary: story.summary,
            assets,
            created_at: Utc::now(),
        };
        let manifest_path = write_json(&dir, "manifest.json", &manifest)?;

        Ok(json!({
            "bundle_id": manifest.bundle_id,
            "title": manifest.title,
            "dir": dir.display().to_string(),
            "manifest": manifest_path.display().to_string(),
            "asset_count": manifest.assets.len(),
        }))
    }
}

#[async_trait]
impl Tool for BundleStoryAssetsTool {
    fn name(&self) -> &str {
        "bundle_story_assets"
    }

    fn description(&self) -> &str {
        "Bundle screenshots and assets into a capture pack with one directory per story"
    }

    async fn call(&self, args: &Value) -> Result<Value, ToolError> {
        let stories: Vec<Story> = args::parse(args, "stories")?;
        if stories.is_empty() {
            return Err(ToolError::invalid("stories", "at least one story is required"));
        }
        let base = args::optional_str(args, "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_dir.clone());
        // Packs made within the same second get distinct directories
        let pack_id = Uuid::new_v4();
        let root = base.join(format!(
            "pack-{}-{}",
            Local::now().format("%Y-%m-%d-%H%M%S"),
            &pack_id.simple().to_string()[..8]
        ));

        let bundles = stories
            .into_iter()
            .enumerate()
            .map(|(i, story)| self.bundle(&root, i, story))
            .collect::<Result<Vec<_>, _>>()?;

        let index_path = write_json(&root, "index.json", &bundles)?;
        info!("Bundled {} stories into {}", bundles.len(), root.display());

        Ok(json!({
            "pack_id": pack_id,
            "pack_dir": root.display().to_string(),
            "index": index_path.display().to_string(),
            "bundle_count": bundles.len(),
            "bundles": bundles,
        }))
    }
}
