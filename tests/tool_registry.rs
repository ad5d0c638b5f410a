//! Tool registries driven the way the CLI drives them: recipe defaults plus caller arguments

mod helpers;

use agent_recipes::tools::registry_for;
use helpers::{load, settings};
use serde_json::{json, Value};

async fn call(template: &str, tool: &str, args: Value, output_dir: &std::path::Path) -> Value {
    let registry = registry_for(template, &settings(output_dir)).expect("registry");
    let args = load(template).tool_arguments(args).expect("arguments");
    registry.invoke(tool, &args).await.expect("tool registered")
}

#[tokio::test]
async fn recipe_config_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let out = call(
        "ai-screenshot-capture",
        "plan_screenshots",
        json!({ "urls": ["https://example.com/story"] }),
        dir.path(),
    )
    .await;

    // resolution comes from the recipe's config
    assert_eq!(out["jobs"][0]["viewport"]["width"], 2560);
    assert_eq!(out["jobs"][0]["viewport"]["height"], 1440);
}

#[tokio::test]
async fn caller_arguments_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let out = call(
        "ai-publisher-pack",
        "build_publish_pack",
        json!({
            "content": { "title": "Open weights model tops the leaderboard" },
            "platforms": ["x", "bluesky"]
        }),
        dir.path(),
    )
    .await;

    assert_eq!(out["posts"].as_array().unwrap().len(), 1);
    assert_eq!(out["posts"][0]["platform"], "x");
    assert_eq!(out["skipped"], json!(["bluesky"]));
}

#[tokio::test]
async fn deduper_thresholds_are_per_tool() {
    let dir = tempfile::tempdir().unwrap();
    let articles = json!([
        { "title": "OpenAI releases GPT-5 model" },
        { "title": "GPT-5 model benchmarks leak" },
        { "title": "Google announces Gemini 2.0" }
    ]);

    let args = load("ai-news-deduper")
        .tool_arguments(json!({ "articles": articles }))
        .unwrap();
    assert_eq!(args["dedup_threshold"], 0.8);
    assert_eq!(args["cluster_threshold"], 0.25);

    let clustered = call(
        "ai-news-deduper",
        "cluster_topics",
        json!({ "articles": articles }),
        dir.path(),
    )
    .await;
    assert_eq!(clustered["count"], 2);
    assert_eq!(clustered["clusters"][0]["articles"], json!([0, 1]));

    // The same pair is related, not duplicated
    let deduped = call(
        "ai-news-deduper",
        "deduplicate_articles",
        json!({ "articles": articles }),
        dir.path(),
    )
    .await;
    assert_eq!(deduped["count"], 3);
}

#[tokio::test]
async fn tool_errors_come_back_as_values() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for("ai-screen-recorder", &settings(dir.path())).unwrap();

    let out = registry.invoke("plan_recording", &json!({})).await.unwrap();
    assert!(out["error"].as_str().unwrap().contains("url"));

    let out = registry
        .invoke("plan_recording", &json!({ "url": "https://example.com", "fps": 500 }))
        .await
        .unwrap();
    assert!(out["error"].as_str().unwrap().contains("fps"));
}

#[tokio::test]
async fn unknown_tool_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for("ai-news-deduper", &settings(dir.path())).unwrap();
    assert!(registry.invoke("crawl_ai_news", &json!({})).await.is_none());
}

#[tokio::test]
async fn capture_pack_writes_under_settings_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = call(
        "ai-news-capture-pack",
        "bundle_story_assets",
        json!({
            "stories": [
                { "title": "Model release", "url": "https://example.com/release" },
                { "title": "Chip export rules", "assets": ["chart.png"] }
            ]
        }),
        dir.path(),
    )
    .await;

    assert_eq!(out["bundle_count"], 2);
    let pack_dir = std::path::PathBuf::from(out["pack_dir"].as_str().unwrap());
    assert!(pack_dir.starts_with(dir.path().join("capture-packs")));
    assert!(pack_dir.join("index.json").exists());

    let manifest: Value = serde_json::from_str(
        &std::fs::read_to_string(pack_dir.join("01-model-release").join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["title"], "Model release");
    assert_eq!(manifest["assets"], json!(["screenshot-example-com-release.png"]));
}

#[tokio::test]
async fn daily_show_bundle_is_held_for_review() {
    let dir = tempfile::tempdir().unwrap();
    let out = call(
        "ai-daily-news-show",
        "create_output_bundle",
        json!({
            "title": "AI Daily",
            "date": "2026-10-16",
            "script": "# AI Daily\n\nToday in AI...",
            "brief": "- Story one"
        }),
        dir.path(),
    )
    .await;

    // human_approval: true comes from the recipe
    assert_eq!(out["status"], "pending_review");
    let bundle = dir.path().join("shows").join("show-2026-10-16-ai-daily");
    assert_eq!(out["bundle_dir"], bundle.display().to_string());
    for file in ["script.md", "brief.md", "manifest.json"] {
        assert!(bundle.join(file).exists(), "{} missing", file);
    }
}

#[tokio::test]
async fn hook_tester_builds_on_generated_hooks() {
    let dir = tempfile::tempdir().unwrap();
    let out = call(
        "ai-ab-hook-tester",
        "generate_test_variants",
        json!({ "topic": "open source agents", "variants_per_hook": 2 }),
        dir.path(),
    )
    .await;

    let tests = out["tests"].as_array().expect("tests");
    assert!(!tests.is_empty());
    for test in tests {
        assert_eq!(test["variants"].as_array().unwrap().len(), 2);
    }
}
