//! Publishing and distribution tools

use crate::tools::{args, text, write_json, ToolError, ToolRegistry};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Character limits of post bodies per platform
pub const PLATFORM_LIMITS: &[(&str, usize)] = &[
    ("x", 280),
    ("linkedin", 3000),
    ("youtube", 5000),
    ("tiktok", 2200),
    ("instagram", 2200),
    ("threads", 500),
];

const DEFAULT_SLOTS: &[&str] = &["09:00", "13:00", "17:00"];

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z][A-Za-z0-9_]*)").expect("valid regex"));

pub fn platform_limit(platform: &str) -> Option<usize> {
    let platform = platform.to_lowercase();
    let platform = if platform == "twitter" { "x" } else { platform.as_str() };
    PLATFORM_LIMITS
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|&(_, limit)| limit)
}

fn default_hashtag_count(platform: &str) -> usize {
    match platform {
        "instagram" => 10,
        "tiktok" => 5,
        "x" | "twitter" => 2,
        _ => 3,
    }
}

pub fn register_publisher(registry: &mut ToolRegistry) {
    registry.register_fn(
        "build_publish_pack",
        "Build a cross-platform publish pack with bodies trimmed to each platform limit",
        build_publish_pack,
    );
}

pub fn register_calendar(registry: &mut ToolRegistry) {
    registry.register_fn(
        "schedule_calendar",
        "Schedule content items into a dated content calendar",
        schedule_calendar,
    );
}

pub fn register_post_copy(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_post_copy",
        "Generate platform-specific post copy for a topic",
        generate_post_copy,
    );
}

pub fn register_hashtags(registry: &mut ToolRegistry) {
    registry.register_fn(
        "optimize_hashtags",
        "Extract keywords from text and turn them into a hashtag set sized for the platform",
        optimize_hashtags,
    );
}

// ---------------------------------------------------------------------------
// Publish pack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct Content {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct PlatformPost {
    platform: String,
    text: String,
    characters: usize,
    limit: usize,
    truncated: bool,
}

fn compose(content: &Content, platform: &str, limit: usize) -> PlatformPost {
    let tags: Vec<String> = content
        .hashtags
        .iter()
        .map(|t| format!("#{}", t.trim_start_matches('#')))
        .collect();
    // Link and tags survive truncation; the body gives way first
    let mut tail = String::new();
    if let Some(url) = &content.url {
        tail.push_str(&format!("\n\n{}", url));
    }
    if !tags.is_empty() {
        tail.push_str(&format!("\n\n{}", tags.join(" ")));
    }

    let head = if content.body.is_empty() || platform == "x" {
        content.title.clone()
    } else {
        format!("{}\n\n{}", content.title, content.body)
    };
    let budget = limit.saturating_sub(tail.chars().count());
    let (head, truncated) = text::truncate_chars(&head, budget);
    let full = format!("{}{}", head, tail);
    let (full, cut) = text::truncate_chars(&full, limit);

    PlatformPost {
        platform: platform.to_string(),
        characters: full.chars().count(),
        text: full,
        limit,
        truncated: truncated || cut,
    }
}

fn build_publish_pack(args: &Value) -> Result<Value, ToolError> {
    let content: Content = args::parse(args, "content")?;
    let mut platforms = args::string_list(args, "platforms")?;
    if platforms.is_empty() {
        platforms = PLATFORM_LIMITS.iter().map(|(p, _)| p.to_string()).collect();
    }

    let mut posts = Vec::new();
    let mut skipped = Vec::new();
    for platform in &platforms {
        let key = platform.to_lowercase();
        match platform_limit(&key) {
            Some(limit) => posts.push(compose(&content, &key, limit)),
            None => {
                warn!("No publishing profile for platform: {}", platform);
                skipped.push(platform.clone());
            }
        }
    }

    let mut result = json!({ "title": content.title, "posts": posts, "skipped": skipped });
    if let Some(dir) = args::optional_str(args, "output_dir") {
        let path = write_json(Path::new(dir), "publish-pack.json", &result)?;
        result["output_file"] = json!(path.display().to_string());
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CalendarItem {
    Title(String),
    Detailed {
        title: String,
        #[serde(default)]
        platform: Option<String>,
    },
}

impl CalendarItem {
    fn parts(&self) -> (&str, Option<&str>) {
        match self {
            CalendarItem::Title(title) => (title, None),
            CalendarItem::Detailed { title, platform } => (title, platform.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CalendarEntry {
    date: NaiveDate,
    time: String,
    weekday: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn schedule_calendar(args: &Value) -> Result<Value, ToolError> {
    let items: Vec<CalendarItem> = args::parse(args, "items")?;
    let start = match args::optional_str(args, "start_date") {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| ToolError::invalid("start_date", e.to_string()))?,
        None => Local::now().date_naive(),
    };

    let mut slots = args::string_list(args, "slots")?;
    if slots.is_empty() {
        slots = DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect();
    }
    let slots = slots
        .iter()
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M")
                .map_err(|_| ToolError::invalid("slots", format!("expected HH:MM, got '{}'", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let posts_per_day = args::usize_or(args, "posts_per_day", 1)?;
    if posts_per_day == 0 || posts_per_day > slots.len() {
        return Err(ToolError::invalid(
            "posts_per_day",
            format!("must be between 1 and the number of slots ({})", slots.len()),
        ));
    }
    let skip_weekends = args::bool_or(args, "skip_weekends", false);

    let mut entries = Vec::with_capacity(items.len());
    let mut day = start;
    let mut used = 0;
    for item in &items {
        if used == posts_per_day {
            day = day + Days::new(1);
            used = 0;
        }
        while skip_weekends && is_weekend(day) {
            day = day + Days::new(1);
        }
        let (title, platform) = item.parts();
        entries.push(CalendarEntry {
            date: day,
            time: slots[used].format("%H:%M").to_string(),
            weekday: day.weekday().to_string(),
            title: title.to_string(),
            platform: platform.map(str::to_string),
        });
        used += 1;
    }

    let end = entries.last().map(|e| e.date).unwrap_or(start);
    debug!("Scheduled {} items from {} to {}", entries.len(), start, end);
    Ok(json!({
        "entries": entries,
        "start_date": start,
        "end_date": end,
        "days": (end - start).num_days() + 1,
    }))
}

// ---------------------------------------------------------------------------
// Post copy and hashtags
// ---------------------------------------------------------------------------

fn generate_post_copy(args: &Value) -> Result<Value, ToolError> {
    let topic = args::required_str(args, "topic")?;
    let summary = args::str_or(args, "summary", "");
    let platform = args::str_or(args, "platform", "x").to_lowercase();
    let limit = platform_limit(&platform).ok_or_else(|| {
        ToolError::invalid("platform", format!("no copy profile for '{}'", platform))
    })?;

    let copy = match platform.as_str() {
        "x" | "twitter" | "threads" => {
            if summary.is_empty() {
                format!("{} 🧵", topic)
            } else {
                format!("{}: {}", topic, summary)
            }
        }
        "linkedin" => format!(
            "{}\n\n{}\n\nWhat does this change for your team? Let me know below.",
            topic,
            if summary.is_empty() { "Here is what you need to know." } else { summary }
        ),
        "youtube" => format!(
            "{}\n\n{}\n\nSubscribe for daily AI news.",
            topic, summary
        ),
        _ => format!("{} ✨ {}\n\nFollow for more.", topic, summary),
    };
    let (copy, truncated) = text::truncate_chars(copy.trim(), limit);

    Ok(json!({
        "platform": platform,
        "characters": copy.chars().count(),
        "copy": copy,
        "limit": limit,
        "truncated": truncated,
    }))
}

fn hashtag(keyword: &str) -> String {
    let cleaned: String = keyword.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("#{}", cleaned)
}

fn optimize_hashtags(args: &Value) -> Result<Value, ToolError> {
    let text = args::required_str(args, "text")?;
    let platform = args::str_or(args, "platform", "instagram").to_lowercase();
    let max = args::usize_or(args, "max_hashtags", default_hashtag_count(&platform))?;

    // Hashtags the author already wrote come first
    let mut hashtags: Vec<String> = Vec::new();
    for cap in HASHTAG.captures_iter(text) {
        let tag = format!("#{}", cap[1].to_lowercase());
        if !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }

    let without_tags = HASHTAG.replace_all(text, " ");
    let tokens: Vec<String> = text::tokens(&without_tags)
        .into_iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_alphabetic()))
        .collect();
    let keywords = text::top_terms(&tokens, 10);
    for keyword in &keywords {
        let tag = hashtag(keyword);
        if tag.len() > 2 && !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }
    hashtags.truncate(max);

    Ok(json!({
        "platform": platform,
        "hashtags": hashtags,
        "keywords": keywords,
    }))
}
