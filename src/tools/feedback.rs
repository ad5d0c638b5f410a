//! Feedback and learning tools: performance analysis, comment mining and
//! A/B hook tests

use crate::tools::{args, script, text, ToolError, ToolRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::debug;

static QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\?\s*$|^\s*(how|what|why|when|where|which|can|could|will|is|are|does|do)\b)")
        .expect("valid regex")
});

static REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(please|can you|could you|would love|make a video|do a video|cover|explain|tutorial|next video)\b",
    )
    .expect("valid regex")
});

pub fn register_analyzer(registry: &mut ToolRegistry) {
    registry.register_fn(
        "analyze_performance",
        "Analyze content metrics: engagement rate, averages, best and worst performers",
        analyze_performance,
    );
}

pub fn register_comment_miner(registry: &mut ToolRegistry) {
    registry.register_fn(
        "extract_ideas",
        "Extract content ideas from audience questions and requests in comments",
        extract_ideas,
    );
}

pub fn register_ab_tester(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_test_variants",
        "Generate an A/B test matrix of hook variants",
        generate_test_variants,
    );
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct Metric {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    views: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    shares: u64,
}

#[derive(Debug, Clone, Serialize)]
struct ItemReport {
    id: String,
    title: Option<String>,
    views: u64,
    interactions: u64,
    engagement_rate: f64,
}

impl From<(usize, Metric)> for ItemReport {
    fn from((index, m): (usize, Metric)) -> Self {
        let interactions = m.likes.saturating_add(m.comments).saturating_add(m.shares);
        let engagement_rate = if m.views == 0 {
            0.0
        } else {
            round4(interactions as f64 / m.views as f64)
        };
        Self {
            id: m.id.unwrap_or_else(|| format!("item-{}", index + 1)),
            title: m.title,
            views: m.views,
            interactions,
            engagement_rate,
        }
    }
}

fn analyze_performance(args: &Value) -> Result<Value, ToolError> {
    let metrics: Vec<Metric> = args::parse(args, "metrics")?;
    if metrics.is_empty() {
        return Err(ToolError::invalid("metrics", "at least one item is required"));
    }

    let items: Vec<ItemReport> = metrics.into_iter().enumerate().map(ItemReport::from).collect();
    let n = items.len() as f64;
    let avg_views = items.iter().map(|i| i.views as f64).sum::<f64>() / n;
    let avg_rate = items.iter().map(|i| i.engagement_rate).sum::<f64>() / n;

    // First item wins ties in both directions
    let mut best = &items[0];
    let mut worst = &items[0];
    for item in &items[1..] {
        if item.engagement_rate > best.engagement_rate {
            best = item;
        }
        if item.engagement_rate < worst.engagement_rate {
            worst = item;
        }
    }

    let above_average: Vec<&str> = items
        .iter()
        .filter(|i| i.engagement_rate > avg_rate)
        .map(|i| i.id.as_str())
        .collect();

    Ok(json!({
        "count": items.len(),
        "average_views": round4(avg_views),
        "average_engagement_rate": round4(avg_rate),
        "best": best,
        "worst": worst,
        "above_average": above_average,
        "items": items,
    }))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Comment {
    Text(String),
    Detailed {
        text: String,
        #[serde(default)]
        likes: u64,
    },
}

impl Comment {
    fn text(&self) -> &str {
        match self {
            Comment::Text(text) | Comment::Detailed { text, .. } => text,
        }
    }

    fn likes(&self) -> u64 {
        match self {
            Comment::Text(_) => 0,
            Comment::Detailed { likes, .. } => *likes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Idea {
    kind: &'static str,
    comment: String,
    keywords: Vec<String>,
    likes: u64,
}

fn extract_ideas(args: &Value) -> Result<Value, ToolError> {
    let comments: Vec<Comment> = args::parse(args, "comments")?;
    let max_ideas = args::usize_or(args, "max_ideas", 10)?;

    let mut ideas: Vec<Idea> = comments
        .iter()
        .filter_map(|c| {
            let body = c.text().trim();
            let kind = if REQUEST.is_match(body) {
                "request"
            } else if QUESTION.is_match(body) {
                "question"
            } else {
                return None;
            };
            let tokens = text::tokens(body);
            Some(Idea {
                kind,
                comment: body.to_string(),
                keywords: text::top_terms(&tokens, 3),
                likes: c.likes(),
            })
        })
        .collect();
    // Most liked first; stable so equal likes keep comment order
    ideas.sort_by(|a, b| b.likes.cmp(&a.likes));

    let all_keywords: Vec<String> = ideas.iter().flat_map(|i| i.keywords.clone()).collect();
    let themes = text::top_terms(&all_keywords, 5);
    let questions = ideas.iter().filter(|i| i.kind == "question").count();
    let requests = ideas.len() - questions;
    ideas.truncate(max_ideas);
    debug!("Mined {} ideas from {} comments", ideas.len(), comments.len());

    Ok(json!({
        "total_comments": comments.len(),
        "questions": questions,
        "requests": requests,
        "themes": themes,
        "ideas": ideas,
    }))
}

// ---------------------------------------------------------------------------
// A/B variants
// ---------------------------------------------------------------------------

const TRANSFORMS: &[&str] = &["question", "urgency", "curiosity"];

fn transform(hook: &str, kind: &str) -> String {
    let core = hook.trim().trim_end_matches(['.', '!', '?']);
    match kind {
        "question" => format!("Did you know {}?", lowercase_first(core)),
        "urgency" => format!("Right now: {}.", core),
        _ => format!("{}. Here's what nobody is telling you.", core),
    }
}

/// Lowercase the first letter unless the first word looks like an acronym
fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), s.chars().nth(1)) {
        (Some(first), Some(second)) if second.is_lowercase() => {
            first.to_lowercase().chain(chars).collect()
        }
        _ => s.to_string(),
    }
}

fn variant_label(i: usize) -> char {
    (b'A' + i as u8) as char
}

fn generate_test_variants(args: &Value) -> Result<Value, ToolError> {
    let mut hooks = args::string_list(args, "hooks")?;
    if hooks.is_empty() {
        let topic = args::required_str(args, "topic")
            .map_err(|_| ToolError::MissingArgument("hooks or topic".to_string()))?;
        let count = args::usize_or(args, "hook_count", 3)?;
        hooks = script::hook_variants(topic, count)
            .into_iter()
            .map(|h| h.text)
            .collect();
    }
    let per_hook = args::usize_or(args, "variants_per_hook", 2)?;
    if !(2..=TRANSFORMS.len() + 1).contains(&per_hook) {
        return Err(ToolError::invalid(
            "variants_per_hook",
            format!("must be between 2 and {}", TRANSFORMS.len() + 1),
        ));
    }

    let tests: Vec<Value> = hooks
        .iter()
        .enumerate()
        .map(|(h, hook)| {
            let mut variants = vec![json!({
                "id": format!("h{}-A", h + 1),
                "text": hook,
                "transform": "control",
            })];
            for (i, kind) in TRANSFORMS.iter().take(per_hook - 1).enumerate() {
                variants.push(json!({
                    "id": format!("h{}-{}", h + 1, variant_label(i + 1)),
                    "text": transform(hook, kind),
                    "transform": kind,
                }));
            }
            json!({ "hook_id": format!("h{}", h + 1), "variants": variants })
        })
        .collect();

    let split = round4(100.0 / per_hook as f64);
    Ok(json!({
        "tests": tests,
        "variants_per_hook": per_hook,
        "total_variants": hooks.len() * per_hook,
        "traffic_split_percent": split,
    }))
}
