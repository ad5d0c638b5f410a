//! News intelligence tools: crawling, deduplication, clustering, ranking,
//! enrichment and brief generation

use crate::core::Settings;
use crate::tools::{
    args,
    client::{http_client, CrawlerConfig},
    text, write_json, write_text, Tool, ToolError, ToolRegistry,
};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// A news article as passed between the news tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub published: Option<DateTime<Utc>>,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
}

impl Article {
    fn lead(&self) -> Option<String> {
        text::sentences(&self.content)
            .into_iter()
            .next()
            .map(|s| text::truncate_chars(&s, 200).0)
    }
}

pub fn register_crawler(registry: &mut ToolRegistry, settings: &Settings) {
    registry.register(CrawlNewsTool::new(settings.crawler.clone()));
}

pub fn register_deduper(registry: &mut ToolRegistry) {
    registry
        .register_fn(
            "deduplicate_articles",
            "Deduplicate articles by normalized URL and title similarity",
            deduplicate_articles,
        )
        .register_fn(
            "cluster_topics",
            "Group articles into topic clusters by shared title keywords",
            cluster_topics,
        );
}

pub fn register_ranker(registry: &mut ToolRegistry) {
    registry.register_fn(
        "rank_signals",
        "Rank articles by weighted criteria: recency, source authority, engagement, novelty",
        rank_signals,
    );
}

pub fn register_enricher(registry: &mut ToolRegistry) {
    registry.register_fn(
        "enrich_context",
        "Add background, prior_art and hype assessment to an article",
        enrich_context,
    );
}

pub fn register_brief(registry: &mut ToolRegistry) {
    registry.register_fn(
        "generate_brief",
        "Generate a daily or weekly markdown news brief with a summary",
        generate_brief,
    );
}

// ---------------------------------------------------------------------------
// Crawling
// ---------------------------------------------------------------------------

/// Crawls AI stories from the Hacker News search API
pub struct CrawlNewsTool {
    client: reqwest::Client,
    config: CrawlerConfig,
}

#[derive(Debug, Deserialize)]
struct HnSearchResponse {
    #[serde(default)]
    hits: Vec<HnHit>,
}

#[derive(Debug, Deserialize)]
struct HnHit {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "objectID", default)]
    object_id: String,
    created_at: Option<DateTime<Utc>>,
    points: Option<u64>,
    num_comments: Option<u64>,
    story_text: Option<String>,
}

impl HnHit {
    fn into_article(self) -> Option<Article> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", self.object_id));

        Some(Article {
            title,
            url,
            source: "Hacker News".to_string(),
            published: self.created_at,
            content: self.story_text.unwrap_or_default(),
            points: self.points,
            comments: self.num_comments,
        })
    }
}

impl CrawlNewsTool {
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
        }
    }

    async fn fetch_hackernews(&self, query: &str, limit: usize) -> Result<Vec<Article>, ToolError> {
        let url = format!(
            "{}/api/v1/search_by_date",
            self.config.hackernews_endpoint.trim_end_matches('/')
        );
        let per_page = limit.to_string();
        debug!("Fetching {} Hacker News stories for '{}'", limit, query);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("tags", "story"), ("hitsPerPage", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let page: HnSearchResponse = response.json().await?;
        Ok(page
            .hits
            .into_iter()
            .filter_map(HnHit::into_article)
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl Tool for CrawlNewsTool {
    fn name(&self) -> &str {
        "crawl_ai_news"
    }

    fn description(&self) -> &str {
        "Crawl recent AI news articles from configured sources"
    }

    async fn call(&self, args: &Value) -> Result<Value, ToolError> {
        let mut sources = args::string_list(args, "sources")?;
        if sources.is_empty() {
            sources.push("hackernews".to_string());
        }
        let max_articles = args::usize_or(args, "max_articles", 20)?;
        let query = args::str_or(args, "query", &self.config.query);

        let mut articles: Vec<Article> = Vec::new();
        let mut skipped = Vec::new();
        for source in &sources {
            match source.to_lowercase().as_str() {
                "hackernews" | "hacker_news" | "hn" => {
                    let remaining = max_articles.saturating_sub(articles.len());
                    if remaining > 0 {
                        articles.extend(self.fetch_hackernews(query, remaining).await?);
                    }
                }
                _ => {
                    warn!("Unsupported news source: {}", source);
                    skipped.push(source.clone());
                }
            }
        }
        articles.truncate(max_articles);
        info!("Crawled {} articles from {} sources", articles.len(), sources.len());

        let count = articles.len();
        let mut result = json!({
            "articles": articles,
            "count": count,
            "skipped": skipped,
        });

        if let Some(dir) = args::optional_str(args, "output_dir") {
            let path = write_json(Path::new(dir), "articles.json", &result["articles"])?;
            result["output_file"] = json!(path.display().to_string());
        }

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Deduplication and clustering
// ---------------------------------------------------------------------------

/// An article dropped as a duplicate
#[derive(Debug, Clone, Serialize)]
pub struct RemovedArticle {
    pub title: String,
    pub reason: &'static str,
    pub duplicate_of: String,
}

/// Keep the first of each group of duplicate articles.
///
/// Two articles are duplicates when their normalized URLs match or when the
/// Jaccard similarity of their title tokens reaches `threshold`.
pub fn deduplicate(articles: Vec<Article>, threshold: f64) -> (Vec<Article>, Vec<RemovedArticle>) {
    let mut kept: Vec<Article> = Vec::new();
    let mut kept_titles: Vec<HashSet<String>> = Vec::new();
    let mut seen_urls: HashMap<String, usize> = HashMap::new();
    let mut removed = Vec::new();

    for article in articles {
        let has_url = !article.url.trim().is_empty();
        let url_key = text::normalize_url(&article.url);

        if has_url {
            if let Some(&idx) = seen_urls.get(&url_key) {
                removed.push(RemovedArticle {
                    title: article.title,
                    reason: "duplicate_url",
                    duplicate_of: kept[idx].title.clone(),
                });
                continue;
            }
        }

        let title_tokens = text::token_set(&article.title);
        if let Some(idx) = kept_titles
            .iter()
            .position(|t| text::jaccard(t, &title_tokens) >= threshold)
        {
            removed.push(RemovedArticle {
                title: article.title,
                reason: "similar_title",
                duplicate_of: kept[idx].title.clone(),
            });
            continue;
        }

        if has_url {
            seen_urls.insert(url_key, kept.len());
        }
        kept_titles.push(title_tokens);
        kept.push(article);
    }

    (kept, removed)
}

fn threshold_arg(args: &Value, name: &str, default: f64) -> Result<f64, ToolError> {
    let threshold = args::f64_or(args, name, default)?;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ToolError::invalid(name, "must be in (0, 1]"));
    }
    Ok(threshold)
}

fn deduplicate_articles(args: &Value) -> Result<Value, ToolError> {
    let articles: Vec<Article> = args::parse(args, "articles")?;
    let threshold = threshold_arg(args, "dedup_threshold", 0.8)?;
    let input = articles.len();

    let (kept, removed) = deduplicate(articles, threshold);
    info!("Deduplicated {} articles down to {}", input, kept.len());

    Ok(json!({
        "count": kept.len(),
        "articles": kept,
        "removed": removed,
    }))
}

/// A group of related articles
#[derive(Debug, Clone, Serialize)]
pub struct TopicCluster {
    pub label: String,
    pub keywords: Vec<String>,
    /// Indices into the input articles
    pub members: Vec<usize>,
}

fn cluster_text(article: &Article) -> String {
    format!("{} {}", article.title, article.content)
}

/// Greedy single-pass clustering on title and content tokens.
///
/// Each article joins the existing cluster holding its most similar member,
/// or starts a new one when no member reaches `threshold`.
pub fn cluster(articles: &[Article], threshold: f64) -> Vec<TopicCluster> {
    let token_sets: Vec<HashSet<String>> = articles
        .iter()
        .map(|a| text::token_set(&cluster_text(a)))
        .collect();

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, tokens) in token_sets.iter().enumerate() {
        let best = groups
            .iter()
            .enumerate()
            .map(|(g, members)| {
                let similarity = members
                    .iter()
                    .map(|&m| text::jaccard(&token_sets[m], tokens))
                    .fold(0.0, f64::max);
                (g, similarity)
            })
            .filter(|(_, similarity)| *similarity >= threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((g, _)) => groups[g].push(i),
            None => groups.push(vec![i]),
        }
    }

    groups
        .into_iter()
        .map(|members| {
            let words: Vec<String> = members
                .iter()
                .flat_map(|&m| text::tokens(&cluster_text(&articles[m])))
                .collect();
            let keywords = text::top_terms(&words, 3);
            TopicCluster {
                label: keywords.join(" / "),
                keywords,
                members,
            }
        })
        .collect()
}

fn cluster_topics(args: &Value) -> Result<Value, ToolError> {
    let articles: Vec<Article> = args::parse(args, "articles")?;
    let threshold = threshold_arg(args, "cluster_threshold", 0.25)?;

    let clusters = cluster(&articles, threshold);
    debug!("Clustered {} articles into {} topics", articles.len(), clusters.len());

    let clusters: Vec<Value> = clusters
        .into_iter()
        .enumerate()
        .map(|(id, c)| {
            let titles: Vec<&str> = c.members.iter().map(|&m| articles[m].title.as_str()).collect();
            json!({
                "id": id + 1,
                "label": c.label,
                "keywords": c.keywords,
                "articles": c.members,
                "titles": titles,
            })
        })
        .collect();

    Ok(json!({ "count": clusters.len(), "clusters": clusters }))
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

const DEFAULT_CRITERIA: [(&str, f64); 4] = [
    ("recency", 0.3),
    ("authority", 0.25),
    ("engagement", 0.25),
    ("novelty", 0.2),
];

const SOURCE_AUTHORITY: &[(&str, f64)] = &[
    ("nature", 0.95),
    ("arxiv", 0.9),
    ("mit technology review", 0.9),
    ("reuters", 0.9),
    ("ars technica", 0.8),
    ("techcrunch", 0.8),
    ("the verge", 0.8),
    ("wired", 0.8),
    ("venturebeat", 0.7),
    ("hacker news", 0.6),
    ("hackernews", 0.6),
    ("reddit", 0.4),
];

fn criteria_weights(args: &Value) -> Result<Vec<(String, f64)>, ToolError> {
    let raw = args
        .get("ranking_criteria")
        .or_else(|| args.get("criteria"))
        .filter(|v| !v.is_null());

    let weights: Vec<(String, f64)> = match raw {
        None => DEFAULT_CRITERIA
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, weight)| {
                weight
                    .as_f64()
                    .map(|w| (name.clone(), w))
                    .ok_or_else(|| ToolError::invalid("ranking_criteria", format!("weight of '{}' is not a number", name)))
            })
            .collect::<Result<_, _>>()?,
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(|name| (name.to_string(), 1.0))
            .collect(),
        Some(_) => {
            return Err(ToolError::invalid(
                "ranking_criteria",
                "expected a mapping of weights or a list of names",
            ))
        }
    };

    let known: Vec<(String, f64)> = weights
        .into_iter()
        .filter(|(name, _)| {
            let ok = DEFAULT_CRITERIA.iter().any(|(known, _)| known == name);
            if !ok {
                warn!("Ignoring unknown ranking criterion: {}", name);
            }
            ok
        })
        .collect();

    if known.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
        return Err(ToolError::invalid(
            "ranking_criteria",
            "no known criterion with a positive weight",
        ));
    }
    Ok(known)
}

fn authority(source: &str) -> f64 {
    let source = source.to_lowercase();
    SOURCE_AUTHORITY
        .iter()
        .find(|(name, _)| source.contains(name))
        .map(|(_, score)| *score)
        .unwrap_or(0.5)
}

fn recency(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published {
        Some(published) => {
            let hours = (now - published).num_minutes().max(0) as f64 / 60.0;
            1.0 / (1.0 + hours / 24.0)
        }
        None => 0.0,
    }
}

fn engagement(article: &Article) -> f64 {
    if article.points.is_none() && article.comments.is_none() {
        return 0.0;
    }
    let points = article.points.unwrap_or(0) as f64;
    let comments = article.comments.unwrap_or(0) as f64;
    ((1.0 + points + 2.0 * comments).ln() / 1001f64.ln()).min(1.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn rank_signals(args: &Value) -> Result<Value, ToolError> {
    let articles: Vec<Article> = args::parse(args, "articles")?;
    let criteria = criteria_weights(args)?;
    let now = match args::optional_str(args, "reference_time") {
        Some(ts) => ts
            .parse::<DateTime<Utc>>()
            .map_err(|e| ToolError::invalid("reference_time", e.to_string()))?,
        None => Utc::now(),
    };

    let title_tokens: Vec<HashSet<String>> = articles
        .iter()
        .map(|a| text::token_set(&a.title))
        .collect();

    let total_weight: f64 = criteria.iter().map(|(_, w)| w).sum();
    let mut scored: Vec<(f64, Map<String, Value>, &Article)> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let others: HashSet<&String> = title_tokens
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, t)| t.iter())
                .collect();
            let novelty = if title_tokens[i].is_empty() {
                0.0
            } else {
                title_tokens[i].iter().filter(|t| !others.contains(t)).count() as f64
                    / title_tokens[i].len() as f64
            };

            let mut scores = Map::new();
            let mut total = 0.0;
            for (name, weight) in &criteria {
                let score = match name.as_str() {
                    "recency" => recency(article.published, now),
                    "authority" => authority(&article.source),
                    "engagement" => engagement(article),
                    _ => novelty,
                };
                total += score * weight;
                scores.insert(name.clone(), json!(round3(score)));
            }
            (total / total_weight, scores, article)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let ranked: Vec<Value> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, scores, article))| {
            json!({
                "rank": i + 1,
                "score": round3(score),
                "scores": scores,
                "article": article,
            })
        })
        .collect();

    let criteria: Map<String, Value> = criteria
        .into_iter()
        .map(|(name, weight)| (name, json!(weight)))
        .collect();

    Ok(json!({ "ranked": ranked, "criteria": criteria }))
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

const KNOWN_SYSTEMS: &[&str] = &[
    "AlphaFold", "AlphaGo", "BERT", "ChatGPT", "Claude", "Copilot", "DALL-E", "Gemini",
    "GPT-3", "GPT-4", "Llama", "Midjourney", "Mistral", "Sora", "Stable Diffusion",
    "Transformer",
];

const HYPE_TERMS: &[&str] = &[
    "agi", "breakthrough", "changes everything", "disrupt", "game-changer", "game changer",
    "insane", "magic", "mind-blowing", "revolutionary", "sentient", "unprecedented",
];

static HYPE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    HYPE_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            (*term, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

static MODEL_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(GPT|Gemini|Claude|Llama|Phi|Qwen)([- ]?)(\d+)\b").expect("valid regex")
});

/// Known systems mentioned anywhere, plus predecessors of versioned models
/// named in the title
fn prior_art(title: &str, text: &str) -> Vec<Value> {
    let lower = text.to_lowercase();
    let mut seen = BTreeSet::new();
    let mut found = Vec::new();

    for system in KNOWN_SYSTEMS {
        if lower.contains(&system.to_lowercase()) && seen.insert(system.to_lowercase()) {
            found.push(json!({ "name": system, "relation": "mentioned" }));
        }
    }

    for caps in MODEL_VERSION.captures_iter(title) {
        let version: u32 = match caps[3].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if version <= 1 {
            continue;
        }
        let predecessor = format!("{}{}{}", &caps[1], &caps[2], version - 1);
        if seen.insert(predecessor.to_lowercase()) {
            found.push(json!({ "name": predecessor, "relation": "predecessor" }));
        }
    }

    found
}

fn hype(text: &str) -> Value {
    let terms: Vec<&str> = HYPE_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(term, _)| *term)
        .collect();
    let score = (terms.len() as f64 / 4.0).min(1.0);
    let level = if score < 0.25 {
        "low"
    } else if score < 0.6 {
        "medium"
    } else {
        "high"
    };
    json!({ "score": round3(score), "level": level, "terms": terms })
}

fn enrich_context(args: &Value) -> Result<Value, ToolError> {
    let article = match args::parse_opt::<Article>(args, "article")? {
        Some(article) => article,
        None => Article {
            title: args::required_str(args, "title")?.to_string(),
            content: args::str_or(args, "content", "").to_string(),
            ..Default::default()
        },
    };

    let full_text = format!("{}. {}", article.title, article.content);
    let background = {
        let lead: Vec<String> = text::sentences(&article.content).into_iter().take(2).collect();
        if lead.is_empty() {
            format!("No background available for '{}'", article.title)
        } else {
            lead.join(" ")
        }
    };
    let terms = text::tokens(&full_text);

    Ok(json!({
        "title": article.title,
        "background": background,
        "key_terms": text::top_terms(&terms, 5),
        "prior_art": prior_art(&article.title, &full_text),
        "hype": hype(&full_text),
    }))
}

// ---------------------------------------------------------------------------
// Briefs
// ---------------------------------------------------------------------------

fn brief_date(args: &Value) -> Result<NaiveDate, ToolError> {
    match args::optional_str(args, "date") {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| ToolError::invalid("date", e.to_string())),
        None => Ok(Local::now().date_naive()),
    }
}

fn generate_brief(args: &Value) -> Result<Value, ToolError> {
    let articles: Vec<Article> = args::parse(args, "articles")?;
    let format = args::str_or(args, "format", "daily");
    let date = brief_date(args)?;

    let (heading, limit) = match format {
        "daily" => (format!("AI Daily Brief: {}", date), 5),
        "weekly" => (format!("AI Weekly Brief: week of {}", date), 20),
        other => {
            return Err(ToolError::invalid(
                "format",
                format!("unsupported brief format '{}' (daily, weekly)", other),
            ))
        }
    };

    let selected: Vec<&Article> = articles.iter().take(limit).collect();
    let sources: BTreeSet<&str> = selected
        .iter()
        .map(|a| a.source.as_str())
        .filter(|s| !s.is_empty())
        .collect();

    let summary = match selected.first() {
        Some(top) => format!(
            "{} stories from {} sources. Top story: {}.",
            selected.len(),
            sources.len(),
            top.title
        ),
        None => "No stories.".to_string(),
    };

    let mut brief = format!("# {}\n\n{}\n", heading, summary);
    if format == "daily" {
        if !selected.is_empty() {
            brief.push_str("\n## Top stories\n");
        }
        for (i, article) in selected.iter().enumerate() {
            brief.push_str(&format!("\n{}. **{}**", i + 1, article.title));
            if !article.source.is_empty() {
                brief.push_str(&format!(" ({})", article.source));
            }
            brief.push('\n');
            if let Some(lead) = article.lead() {
                brief.push_str(&format!("   {}\n", lead));
            }
            if !article.url.is_empty() {
                brief.push_str(&format!("   {}\n", article.url));
            }
        }
    } else {
        let mut by_source: Vec<(&str, Vec<&Article>)> = Vec::new();
        for article in &selected {
            let source = if article.source.is_empty() { "Other" } else { article.source.as_str() };
            match by_source.iter_mut().find(|(s, _)| *s == source) {
                Some((_, group)) => group.push(*article),
                None => by_source.push((source, vec![*article])),
            }
        }
        for (source, group) in by_source {
            brief.push_str(&format!("\n## {}\n\n", source));
            for article in group {
                match article.lead() {
                    Some(lead) => brief.push_str(&format!("- **{}**: {}\n", article.title, lead)),
                    None => brief.push_str(&format!("- **{}**\n", article.title)),
                }
            }
        }
    }

    let mut result = json!({
        "brief": brief,
        "summary": summary,
        "format": format,
        "date": date.to_string(),
        "count": selected.len(),
    });

    if let Some(dir) = args::optional_str(args, "output_dir") {
        let file = format!("brief-{}-{}.md", format, date);
        let path = write_text(Path::new(dir), &file, &brief)?;
        result["output_file"] = json!(path.display().to_string());
    }

    Ok(result)
}
