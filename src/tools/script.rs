//! Script and story tools: multi-format scripts, angles, hooks, CTAs and
//! fact checking

use crate::tools::{args, news::Article, text, ToolError, ToolRegistry};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Script formats supported by `write_script`
pub const SCRIPT_FORMATS: &[&str] = &["youtube_long", "youtube_short", "x_thread", "linkedin"];

const WORDS_PER_SECOND: f64 = 2.5;
const X_POST_LIMIT: usize = 280;
const LINKEDIN_LIMIT: usize = 3000;

pub fn register_writer(registry: &mut ToolRegistry) {
    registry.register_fn(
        "write_script",
        "Write a script outline for youtube_long, youtube_short, x_thread or linkedin",
        write_script,
    );
}

pub fn register_angles(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_angles",
        "Generate story angles, one per angle type",
        generate_angles,
    );
}

pub fn register_hooks(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_hook_variants",
        "Generate multiple opening hook variants for a topic",
        generate_hook_variants,
    );
}

pub fn register_cta(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_cta",
        "Generate platform-specific calls to action and title options",
        generate_cta,
    );
}

pub fn register_fact_checker(registry: &mut ToolRegistry) {
    registry.register_fn(
        "check_facts",
        "Check claims against source articles and attach citations",
        check_facts,
    );
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct Section {
    name: String,
    seconds: u32,
    words: u32,
    direction: String,
}

impl Section {
    fn new(name: impl Into<String>, seconds: u32, direction: String) -> Self {
        Self {
            name: name.into(),
            seconds,
            words: (seconds as f64 * WORDS_PER_SECOND).round() as u32,
            direction,
        }
    }
}

fn video_sections(topic: &str, key_points: &[String], total: u32, long_form: bool) -> Vec<Section> {
    let hook = ((total as f64 * 0.08).round() as u32).max(3);
    let outro = ((total as f64 * 0.10).round() as u32).max(5);
    let intro = if long_form {
        (total as f64 * 0.07).round() as u32
    } else {
        0
    };
    let body = total.saturating_sub(hook + outro + intro).max(1);

    let mut sections = vec![Section::new(
        "hook",
        hook,
        format!("Open with the most surprising fact about {}.", topic),
    )];
    if intro > 0 {
        sections.push(Section::new(
            "intro",
            intro,
            format!("Set up why {} matters to the viewer.", topic),
        ));
    }

    if key_points.is_empty() {
        sections.push(Section::new(
            "main",
            body,
            format!("Walk through the core story of {}.", topic),
        ));
    } else {
        let n = key_points.len() as u32;
        let share = body / n;
        for (i, point) in key_points.iter().enumerate() {
            let seconds = if i as u32 == n - 1 {
                body - share * (n - 1)
            } else {
                share
            };
            sections.push(Section::new(
                format!("point_{}", i + 1),
                seconds,
                format!("Explain: {}", point),
            ));
        }
    }

    sections.push(Section::new(
        "outro",
        outro,
        "Recap the key takeaway and close with a call to action.".to_string(),
    ));
    sections
}

fn thread_posts(topic: &str, key_points: &[String]) -> Vec<String> {
    let mut bodies = vec![format!("{}: a thread.", topic)];
    bodies.extend(key_points.iter().cloned());
    bodies.push(format!("Follow for more on {}.", topic));

    let total = bodies.len();
    bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let numbered = format!("{}/{} {}", i + 1, total, body);
            text::truncate_chars(&numbered, X_POST_LIMIT).0
        })
        .collect()
}

fn linkedin_post(topic: &str, key_points: &[String]) -> String {
    let mut body = format!("{}\n\n", topic);
    if key_points.is_empty() {
        body.push_str(&format!("Here is why {} matters for your work.\n", topic));
    } else {
        body.push_str("Key takeaways:\n");
        for point in key_points {
            body.push_str(&format!("• {}\n", point));
        }
    }
    body.push_str("\nWhat do you think? Share your take in the comments.");
    text::truncate_chars(&body, LINKEDIN_LIMIT).0
}

fn write_script(args: &Value) -> Result<Value, ToolError> {
    let topic = args::required_str(args, "topic")?;
    let format = args::str_or(args, "format", "youtube_long");
    let tone = args::str_or(args, "tone", "informative");
    let key_points = args::string_list(args, "key_points")?;

    let mut result = json!({ "topic": topic, "format": format, "tone": tone });

    match format {
        "youtube_long" | "youtube_short" => {
            let long_form = format == "youtube_long";
            let default_length = if long_form { 600 } else { 60 };
            let mut total = args::u32_or(args, "target_length", default_length)?;
            if !long_form && total > 60 {
                warn!("Short-form scripts are capped at 60 seconds, got {}", total);
                total = 60;
            }
            if total < 15 {
                return Err(ToolError::invalid("target_length", "must be at least 15 seconds"));
            }

            let sections = video_sections(topic, &key_points, total, long_form);
            let words: u32 = sections.iter().map(|s| s.words).sum();
            result["sections"] = json!(sections);
            result["total_seconds"] = json!(sections.iter().map(|s| s.seconds).sum::<u32>());
            result["estimated_words"] = json!(words);
        }
        "x_thread" => {
            let posts = thread_posts(topic, &key_points);
            result["estimated_words"] = json!(posts.iter().map(|p| text::word_count(p)).sum::<usize>());
            result["posts"] = json!(posts);
        }
        "linkedin" => {
            let body = linkedin_post(topic, &key_points);
            result["estimated_words"] = json!(text::word_count(&body));
            result["body"] = json!(body);
        }
        other => {
            return Err(ToolError::invalid(
                "format",
                format!("unsupported format '{}' ({})", other, SCRIPT_FORMATS.join(", ")),
            ))
        }
    }

    debug!("Wrote {} script for '{}'", format, topic);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Angles and hooks
// ---------------------------------------------------------------------------

const DEFAULT_ANGLES: &[&str] = &["explainer", "contrarian", "practical", "future", "human_interest"];

fn angle_for(kind: &str, topic: &str) -> (String, String) {
    match kind {
        "explainer" => (
            format!("{}, explained", topic),
            "Break down what happened and why it matters.".to_string(),
        ),
        "contrarian" => (
            format!("Why {} is not what it seems", topic),
            "Challenge the dominant narrative with evidence.".to_string(),
        ),
        "practical" => (
            format!("How to use {} today", topic),
            "Concrete steps the audience can try right now.".to_string(),
        ),
        "future" => (
            format!("What {} means for the next five years", topic),
            "Extrapolate the trend and its second-order effects.".to_string(),
        ),
        "human_interest" => (
            format!("The people behind {}", topic),
            "Tell the story through the people it affects.".to_string(),
        ),
        "comparison" => (
            format!("{} vs the alternatives", topic),
            "Compare against the closest competitors.".to_string(),
        ),
        other => {
            let label = other.replace('_', " ");
            (
                format!("{}: a {} take", topic, label),
                format!("Cover the story from a {} angle.", label),
            )
        }
    }
}

fn generate_angles(args: &Value) -> Result<Value, ToolError> {
    let topic = args::required_str(args, "topic")?;
    let mut kinds = args::string_list(args, "angle_types")?;
    if kinds.is_empty() {
        kinds = args::string_list(args, "angles")?;
    }
    if kinds.is_empty() {
        kinds = DEFAULT_ANGLES.iter().map(|s| s.to_string()).collect();
    }

    let angles: Vec<Value> = kinds
        .iter()
        .map(|kind| {
            let (headline, pitch) = angle_for(kind, topic);
            json!({ "type": kind, "headline": headline, "pitch": pitch })
        })
        .collect();

    Ok(json!({ "topic": topic, "count": angles.len(), "angles": angles }))
}

const HOOK_PATTERNS: &[(&str, &str)] = &[
    ("question", "What if everything you knew about {topic} was wrong?"),
    ("statistic", "Here is the one number about {topic} nobody is talking about."),
    ("bold_claim", "{topic} just changed the game."),
    ("story", "Last week, {topic} quietly did something remarkable."),
    ("curiosity_gap", "There is a detail in {topic} that most people missed."),
    ("contrarian", "Everyone is excited about {topic}. Here is why I am not."),
    ("urgency", "If you work in tech, you need to know about {topic} today."),
    ("list", "Three things about {topic} you should know."),
];

/// Hook variant
#[derive(Debug, Clone, Serialize)]
pub struct HookVariant {
    pub id: String,
    pub style: &'static str,
    pub text: String,
}

/// Up to `count` hook variants, one per style
pub fn hook_variants(topic: &str, count: usize) -> Vec<HookVariant> {
    HOOK_PATTERNS
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, &(style, pattern))| HookVariant {
            id: format!("hook-{}", i + 1),
            style,
            text: pattern.replace("{topic}", topic),
        })
        .collect()
}

fn generate_hook_variants(args: &Value) -> Result<Value, ToolError> {
    let topic = args::required_str(args, "topic")?;
    let count = args::usize_or(args, "count", 5)?;
    if count == 0 {
        return Err(ToolError::invalid("count", "must be at least 1"));
    }
    if count > HOOK_PATTERNS.len() {
        warn!("Only {} hook styles available, requested {}", HOOK_PATTERNS.len(), count);
    }

    let variants = hook_variants(topic, count);
    Ok(json!({ "topic": topic, "count": variants.len(), "variants": variants }))
}

// ---------------------------------------------------------------------------
// Calls to action
// ---------------------------------------------------------------------------

/// (platform, call to action, title length limit)
const CTAS: &[(&str, &str, usize)] = &[
    ("youtube", "Subscribe for daily AI news and tell me in the comments what you think about {topic}.", 100),
    ("youtube_short", "Follow for more quick takes on {topic}.", 100),
    ("x", "Repost if this was useful and follow for more on {topic}.", 280),
    ("linkedin", "What is your take on {topic}? Share it in the comments.", 150),
    ("tiktok", "Follow for part two on {topic}.", 100),
    ("instagram", "Save this post and share it with someone following {topic}.", 125),
];

const TITLE_PATTERNS: &[&str] = &[
    "{topic}: What You Need to Know",
    "{topic} Explained in Minutes",
    "Why {topic} Matters Right Now",
];

fn cta_for(platform: &str, topic: &str) -> Result<Value, ToolError> {
    let (_, cta, limit) = CTAS
        .iter()
        .find(|(name, _, _)| *name == platform)
        .ok_or_else(|| {
            let supported: Vec<&str> = CTAS.iter().map(|(name, _, _)| *name).collect();
            ToolError::invalid(
                "platform",
                format!("unsupported platform '{}' ({})", platform, supported.join(", ")),
            )
        })?;

    let titles: Vec<String> = TITLE_PATTERNS
        .iter()
        .map(|pattern| text::truncate_chars(&pattern.replace("{topic}", topic), *limit).0)
        .collect();

    Ok(json!({
        "platform": platform,
        "cta": cta.replace("{topic}", topic),
        "titles": titles,
        "title_limit": limit,
    }))
}

fn generate_cta(args: &Value) -> Result<Value, ToolError> {
    let topic = args::required_str(args, "topic")?;
    let platforms = match args::optional_str(args, "platform") {
        Some(platform) => vec![platform.to_string()],
        None => {
            let platforms = args::string_list(args, "platforms")?;
            if platforms.is_empty() {
                vec!["youtube".to_string()]
            } else {
                platforms
            }
        }
    };

    let ctas = platforms
        .iter()
        .map(|p| cta_for(&p.to_lowercase(), topic))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(json!({ "topic": topic, "ctas": ctas }))
}

// ---------------------------------------------------------------------------
// Fact checking
// ---------------------------------------------------------------------------

fn check_facts(args: &Value) -> Result<Value, ToolError> {
    let body = args::required_str(args, "text")?;
    let sources: Vec<Article> = args::parse_opt(args, "sources")?.unwrap_or_default();
    let min_overlap = args::f64_or(args, "min_overlap", 0.5)?;

    let source_tokens: Vec<HashSet<String>> = sources
        .iter()
        .map(|s| text::token_set(&format!("{} {}", s.title, s.content)))
        .collect();

    let mut cited: Vec<usize> = Vec::new();
    let mut claims = Vec::new();
    let mut supported = 0;

    for claim in text::sentences(body) {
        if text::word_count(&claim) < 4 {
            continue;
        }
        let claim_tokens = text::token_set(&claim);
        if claim_tokens.is_empty() {
            continue;
        }

        let best = source_tokens
            .iter()
            .enumerate()
            .map(|(i, tokens)| {
                let overlap = claim_tokens.intersection(tokens).count() as f64
                    / claim_tokens.len() as f64;
                (i, overlap)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let (citation, confidence) = match best {
            Some((i, overlap)) if overlap >= min_overlap => {
                let id = match cited.iter().position(|&c| c == i) {
                    Some(pos) => pos + 1,
                    None => {
                        cited.push(i);
                        cited.len()
                    }
                };
                supported += 1;
                (Some(id), overlap)
            }
            Some((_, overlap)) => (None, overlap),
            None => (None, 0.0),
        };

        claims.push(json!({
            "claim": claim,
            "supported": citation.is_some(),
            "confidence": (confidence * 100.0).round() / 100.0,
            "citation": citation,
        }));
    }

    let citations: Vec<Value> = cited
        .iter()
        .enumerate()
        .map(|(n, &i)| {
            json!({
                "id": n + 1,
                "title": sources[i].title,
                "url": sources[i].url,
                "source": sources[i].source,
            })
        })
        .collect();

    Ok(json!({
        "supported": supported,
        "unsupported": claims.len() - supported,
        "claims": claims,
        "citations": citations,
    }))
}
