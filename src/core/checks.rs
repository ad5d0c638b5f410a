//! Structural checks over the advertised templates

use crate::core::{catalog::TemplateCatalog, config::RecipeConfig, settings::Settings};
use crate::tools::{registry_for, ToolRegistry};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};
use Requirement::*;

/// Content pipeline stage a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    News,
    Script,
    Video,
    Capture,
    Publishing,
    Feedback,
    Orchestration,
    Research,
}

impl Layer {
    pub const ALL: [Layer; 8] = [
        Layer::News,
        Layer::Script,
        Layer::Video,
        Layer::Capture,
        Layer::Publishing,
        Layer::Feedback,
        Layer::Orchestration,
        Layer::Research,
    ];
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::News => "news intelligence",
            Layer::Script => "script & story",
            Layer::Video => "video generation",
            Layer::Capture => "capture & screen automation",
            Layer::Publishing => "publishing & distribution",
            Layer::Feedback => "feedback & learning",
            Layer::Orchestration => "orchestration",
            Layer::Research => "research",
        };
        f.write_str(name)
    }
}

/// A structural property a template must have
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    /// Any of the keys is present in `config`
    ConfigKey(&'static [&'static str]),

    /// The list under any of the keys has at least `min` items
    ConfigListMin {
        keys: &'static [&'static str],
        min: usize,
    },

    /// Every value appears in the list under `key` (case-insensitive substring)
    ConfigListCovers {
        key: &'static str,
        values: &'static [&'static str],
    },

    /// The descriptor has an `input` section
    InputSection,

    /// The descriptor has a non-empty workflow, pipeline or agents list
    Workflow,

    /// Some tool name or description mentions one of the keywords
    ToolKeyword(&'static [&'static str]),

    /// At least `min` of the keywords are mentioned across the tools
    ToolKeywordsMin {
        keywords: &'static [&'static str],
        min: usize,
    },

    /// The registry contains every named tool
    Tools(&'static [&'static str]),
}

impl Requirement {
    /// Failure message, `None` when satisfied
    fn check(&self, config: &RecipeConfig, tools: Option<&ToolRegistry>) -> Option<String> {
        match *self {
            Requirement::ConfigKey(keys) => (!config.config_has_any(keys))
                .then(|| format!("config is missing {}", keys.join(" / "))),

            Requirement::ConfigListMin { keys, min } => {
                let len = config.config_list(keys).map_or(0, |items| items.len());
                (len < min).then(|| {
                    format!("config {} has {} entries, expected at least {}", keys.join(" / "), len, min)
                })
            }

            Requirement::ConfigListCovers { key, values } => {
                let items: Vec<String> = config
                    .config_list(&[key])
                    .unwrap_or_default()
                    .iter()
                    .map(|i| i.to_lowercase())
                    .collect();
                let missing: Vec<&str> = values
                    .iter()
                    .copied()
                    .filter(|v| !items.iter().any(|i| i.contains(&v.to_lowercase())))
                    .collect();
                (!missing.is_empty())
                    .then(|| format!("config {} does not cover {}", key, missing.join(", ")))
            }

            Requirement::InputSection => {
                (!config.has_input()).then(|| "descriptor has no input section".to_string())
            }

            Requirement::Workflow => config
                .workflow_stages()
                .is_empty()
                .then(|| "descriptor has no workflow, pipeline or agents".to_string()),

            Requirement::ToolKeyword(keywords) => {
                let tools = tools?;
                (mentioned(tools, keywords) == 0)
                    .then(|| format!("no tool mentions {}", keywords.join(" / ")))
            }

            Requirement::ToolKeywordsMin { keywords, min } => {
                let tools = tools?;
                let found = mentioned(tools, keywords);
                (found < min).then(|| {
                    format!(
                        "tools mention {} of {}, expected at least {}",
                        found,
                        keywords.join(" / "),
                        min
                    )
                })
            }

            Requirement::Tools(names) => {
                let tools = tools?;
                let missing: Vec<&str> = names.iter().copied().filter(|n| !tools.contains(n)).collect();
                (!missing.is_empty()).then(|| format!("missing tools: {}", missing.join(", ")))
            }
        }
    }
}

/// Number of keywords mentioned by some tool's name or description
fn mentioned(tools: &ToolRegistry, keywords: &[&str]) -> usize {
    let haystack: Vec<String> = tools
        .all()
        .iter()
        .map(|t| format!("{} {}", t.name(), t.description()).to_lowercase())
        .collect();
    keywords
        .iter()
        .filter(|k| {
            let k = k.to_lowercase();
            haystack.iter().any(|h| h.contains(&k))
        })
        .count()
}

/// An advertised template and what it must provide
#[derive(Debug, Clone, Copy)]
pub struct AdvertisedTemplate {
    pub name: &'static str,
    pub layer: Layer,
    pub requirements: &'static [Requirement],
}

const fn advertised(
    name: &'static str,
    layer: Layer,
    requirements: &'static [Requirement],
) -> AdvertisedTemplate {
    AdvertisedTemplate {
        name,
        layer,
        requirements,
    }
}

/// Templates the collection advertises, by layer
pub const ADVERTISED: &[AdvertisedTemplate] = &[
    // News intelligence
    advertised("ai-news-crawler", Layer::News, &[ConfigKey(&["sources"])]),
    advertised(
        "ai-news-deduper",
        Layer::News,
        &[ToolKeyword(&["dedup"]), ToolKeyword(&["cluster"])],
    ),
    advertised(
        "ai-signal-ranker",
        Layer::News,
        &[ConfigKey(&["ranking_criteria", "criteria"])],
    ),
    advertised(
        "ai-context-enricher",
        Layer::News,
        &[ToolKeywordsMin {
            keywords: &["background", "prior_art", "hype"],
            min: 2,
        }],
    ),
    advertised(
        "ai-brief-generator",
        Layer::News,
        &[ConfigKey(&["formats", "format"])],
    ),
    // Script & story
    advertised(
        "ai-script-writer",
        Layer::Script,
        &[ConfigListCovers {
            key: "formats",
            values: &["youtube_long", "youtube_short", "x_thread", "linkedin"],
        }],
    ),
    advertised(
        "ai-angle-generator",
        Layer::Script,
        &[ConfigListMin {
            keys: &["angle_types", "angles"],
            min: 3,
        }],
    ),
    advertised(
        "ai-hook-generator",
        Layer::Script,
        &[ToolKeyword(&["variant", "multiple"])],
    ),
    advertised(
        "ai-cta-generator",
        Layer::Script,
        &[ConfigKey(&["platforms", "platform"])],
    ),
    advertised(
        "ai-fact-checker",
        Layer::Script,
        &[ToolKeyword(&["citation", "source"])],
    ),
    // Video generation
    advertised(
        "ai-broll-builder",
        Layer::Video,
        &[ToolKeyword(&["ken_burns", "pan", "zoom"])],
    ),
    advertised(
        "ai-voiceover-generator",
        Layer::Video,
        &[ToolKeyword(&["tts", "speech", "voice"])],
    ),
    advertised(
        "ai-video-merger",
        Layer::Video,
        &[ToolKeyword(&["merge", "sync"])],
    ),
    advertised("shorts-generator", Layer::Video, &[]),
    // Capture & screen automation
    advertised(
        "ai-screenshot-capture",
        Layer::Capture,
        &[ConfigKey(&["resolution", "quality"])],
    ),
    advertised(
        "ai-screen-recorder",
        Layer::Capture,
        &[ConfigKey(&["fps", "duration"])],
    ),
    advertised(
        "ai-news-capture-pack",
        Layer::Capture,
        &[ToolKeyword(&["bundle", "pack"])],
    ),
    // Publishing & distribution
    advertised(
        "ai-publisher-pack",
        Layer::Publishing,
        &[ConfigKey(&["platforms"])],
    ),
    advertised(
        "ai-content-calendar",
        Layer::Publishing,
        &[ToolKeyword(&["schedule", "calendar"])],
    ),
    advertised(
        "ai-post-copy-generator",
        Layer::Publishing,
        &[ConfigKey(&["platforms", "platform"])],
    ),
    advertised(
        "ai-hashtag-optimizer",
        Layer::Publishing,
        &[ToolKeyword(&["hashtag", "keyword"])],
    ),
    // Feedback & learning
    advertised("ai-performance-analyzer", Layer::Feedback, &[InputSection]),
    advertised(
        "ai-comment-miner",
        Layer::Feedback,
        &[ToolKeyword(&["idea", "extract"])],
    ),
    advertised(
        "ai-ab-hook-tester",
        Layer::Feedback,
        &[ToolKeyword(&["variant", "test"])],
    ),
    // Orchestration
    advertised(
        "ai-daily-news-show",
        Layer::Orchestration,
        &[
            Workflow,
            ConfigKey(&["human_approval", "approval", "review"]),
            ToolKeyword(&["bundle", "output"]),
        ],
    ),
    // Research
    advertised(
        "ai-topic-gatherer",
        Layer::Research,
        &[Tools(&["today", "tavily_search"])],
    ),
];

/// Look up an advertised template by name
pub fn advertised_template(name: &str) -> Option<&'static AdvertisedTemplate> {
    ADVERTISED.iter().find(|t| t.name == name)
}

/// Result of checking one template
#[derive(Debug, Clone, Serialize)]
pub struct TemplateCheck {
    pub name: String,
    pub layer: Layer,
    pub failures: Vec<String>,
}

impl TemplateCheck {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Results of checking every advertised template
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub templates: Vec<TemplateCheck>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.templates.iter().all(TemplateCheck::passed)
    }

    /// Templates with at least one failure
    pub fn failures(&self) -> impl Iterator<Item = &TemplateCheck> {
        self.templates.iter().filter(|t| !t.passed())
    }

    pub fn get(&self, name: &str) -> Option<&TemplateCheck> {
        self.templates.iter().find(|t| t.name == name)
    }
}

/// Check a single advertised template against the catalog
pub fn check_template(
    template: &AdvertisedTemplate,
    catalog: &TemplateCatalog,
    settings: &Settings,
) -> TemplateCheck {
    let mut failures = Vec::new();
    let name = template.name;

    let tools = registry_for(name, settings);
    if tools.is_none() {
        failures.push("no tool registry".to_string());
    }

    if !catalog.contains(name) {
        failures.push(format!(
            "template directory missing: {}",
            catalog.template_dir(name).display()
        ));
    } else {
        match catalog.load(name) {
            Ok(recipe) => {
                for stage in recipe.config.workflow_stages() {
                    if let (Some(tool), Some(registry)) = (&stage.tool, &tools) {
                        if !registry.contains(tool) {
                            failures.push(format!(
                                "stage '{}' uses unknown tool '{}'",
                                stage.id, tool
                            ));
                        }
                    }
                    if let Some(other) = &stage.recipe {
                        if !catalog.contains(other) {
                            failures.push(format!(
                                "stage '{}' uses unknown recipe '{}'",
                                stage.id, other
                            ));
                        }
                    }
                }

                failures.extend(
                    template
                        .requirements
                        .iter()
                        .filter_map(|r| r.check(&recipe.config, tools.as_ref())),
                );
            }
            Err(e) => failures.push(format!("{:#}", e)),
        }
    }

    if failures.is_empty() {
        debug!("Template {} passed", name);
    } else {
        warn!("Template {} failed {} checks", name, failures.len());
    }

    TemplateCheck {
        name: name.to_string(),
        layer: template.layer,
        failures,
    }
}

/// Check every advertised template
pub fn check_catalog(catalog: &TemplateCatalog, settings: &Settings) -> CheckReport {
    check_catalog_with(catalog, settings, |_| {})
}

/// Check every advertised template, calling `on_checked` after each one
pub fn check_catalog_with<F>(catalog: &TemplateCatalog, settings: &Settings, mut on_checked: F) -> CheckReport
where
    F: FnMut(&TemplateCheck),
{
    let templates = ADVERTISED
        .iter()
        .map(|template| {
            let check = check_template(template, catalog, settings);
            on_checked(&check);
            check
        })
        .collect();
    CheckReport { templates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::KNOWN_TEMPLATES;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_recipe(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("recipe.yaml"), body).unwrap();
    }

    fn check(name: &str, root: &Path) -> TemplateCheck {
        let catalog = TemplateCatalog::open(root).unwrap();
        check_template(advertised_template(name).unwrap(), &catalog, &Settings::default())
    }

    #[test]
    fn test_advertised_templates_have_registries() {
        assert_eq!(ADVERTISED.len(), KNOWN_TEMPLATES.len());
        for template in ADVERTISED {
            assert!(KNOWN_TEMPLATES.contains(&template.name), "{}", template.name);
        }
    }

    #[test]
    fn test_every_layer_is_advertised() {
        for layer in Layer::ALL {
            assert!(ADVERTISED.iter().any(|t| t.layer == layer), "{}", layer);
        }
    }

    #[test]
    fn test_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let result = check("ai-news-crawler", tmp.path());
        assert!(!result.passed());
        assert!(result.failures[0].contains("template directory missing"));
    }

    #[test]
    fn test_config_key_requirement() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "ai-news-crawler", "name: ai-news-crawler\nconfig: {}\n");
        let result = check("ai-news-crawler", tmp.path());
        assert_eq!(result.failures, vec!["config is missing sources"]);

        write_recipe(
            tmp.path(),
            "ai-news-crawler",
            "name: ai-news-crawler\nconfig:\n  sources: [hackernews]\n",
        );
        assert!(check("ai-news-crawler", tmp.path()).passed());
    }

    #[test]
    fn test_list_requirements() {
        let tmp = TempDir::new().unwrap();
        write_recipe(
            tmp.path(),
            "ai-script-writer",
            "name: ai-script-writer\nconfig:\n  formats: [youtube_long, x_thread]\n",
        );
        let result = check("ai-script-writer", tmp.path());
        assert_eq!(
            result.failures,
            vec!["config formats does not cover youtube_short, linkedin"]
        );

        write_recipe(
            tmp.path(),
            "ai-angle-generator",
            "name: ai-angle-generator\nconfig:\n  angles: [a, b]\n",
        );
        let result = check("ai-angle-generator", tmp.path());
        assert!(result.failures[0].contains("has 2 entries"));
    }

    #[test]
    fn test_workflow_references_are_resolved() {
        let tmp = TempDir::new().unwrap();
        write_recipe(
            tmp.path(),
            "ai-daily-news-show",
            r#"
name: ai-daily-news-show
config:
  human_approval: true
workflow:
  - id: crawl
    recipe: ai-news-crawler
  - id: bundle
    tool: create_output_bundle
    depends_on: [crawl]
  - id: publish
    tool: publish_everywhere
    depends_on: [bundle]
"#,
        );
        let result = check("ai-daily-news-show", tmp.path());
        assert_eq!(
            result.failures,
            vec![
                "stage 'crawl' uses unknown recipe 'ai-news-crawler'",
                "stage 'publish' uses unknown tool 'publish_everywhere'",
            ]
        );
    }

    #[test]
    fn test_invalid_descriptor_is_reported() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "ai-performance-analyzer", "name: [unclosed\n");
        let result = check("ai-performance-analyzer", tmp.path());
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].contains("Invalid recipe descriptor"));
    }

    #[test]
    fn test_report_collects_failures() {
        let tmp = TempDir::new().unwrap();
        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        let mut seen = 0;
        let report = check_catalog_with(&catalog, &Settings::default(), |_| seen += 1);
        assert_eq!(seen, ADVERTISED.len());
        assert!(!report.passed());
        assert_eq!(report.failures().count(), ADVERTISED.len());
    }
}
