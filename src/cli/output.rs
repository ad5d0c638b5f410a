//! CLI output formatting

use crate::core::{checks::TemplateCheck, Layer, Workflow};
use crate::core::workflow::StageTarget;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static TOOL: Emoji<'_, '_> = Emoji("🔧 ", "* ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a layer name for display
pub fn format_layer(layer: Option<Layer>) -> String {
    match layer {
        Some(layer) => style(layer.to_string()).cyan().to_string(),
        None => style("unlisted").dim().to_string(),
    }
}

/// Format one template check result
pub fn format_check(check: &TemplateCheck) -> String {
    if check.passed() {
        return format!("{} {}", CHECK, style(&check.name).green());
    }

    let mut out = format!(
        "{} {} ({})",
        CROSS,
        style(&check.name).red().bold(),
        style(check.layer).dim()
    );
    for failure in &check.failures {
        out.push_str(&format!("\n    {}", style(failure).red()));
    }
    out
}

/// Format a stage target for display
pub fn format_target(target: &StageTarget) -> String {
    match target {
        StageTarget::Tool(name) => format!("tool {}", style(name).cyan()),
        StageTarget::Recipe(name) => format!("recipe {}", style(name).magenta()),
        StageTarget::Agent(name) => format!("agent {}", style(name).yellow()),
        StageTarget::None => style("no target").dim().to_string(),
    }
}

/// Format a workflow in execution order, one stage per line
pub fn format_workflow(workflow: &Workflow) -> Vec<String> {
    workflow
        .ordered_stages()
        .enumerate()
        .map(|(i, stage)| {
            let mut line = format!(
                "{:>3}. {} → {}",
                i + 1,
                style(&stage.id).bold(),
                format_target(&stage.target)
            );
            if !stage.dependencies.is_empty() {
                line.push_str(&format!(
                    " {}",
                    style(format!("(after {})", stage.dependencies.join(", "))).dim()
                ));
            }
            line
        })
        .collect()
}

/// Format output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StageConfig;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    #[test]
    fn test_format_output_truncates() {
        let output = "a\nb\nc\nd";
        assert_eq!(format_output(output, 10), output);
        let truncated = plain(&format_output(output, 2));
        assert!(truncated.starts_with("a\nb\n"));
        assert!(truncated.ends_with("(2 more lines)"));
    }

    #[test]
    fn test_format_check() {
        let check = TemplateCheck {
            name: "ai-news-crawler".to_string(),
            layer: Layer::News,
            failures: vec!["config is missing sources".to_string()],
        };
        let text = plain(&format_check(&check));
        assert!(text.contains("ai-news-crawler (news intelligence)"));
        assert!(text.contains("config is missing sources"));
    }

    #[test]
    fn test_format_workflow() {
        let stages = vec![
            StageConfig {
                id: "crawl".to_string(),
                name: None,
                description: None,
                tool: None,
                recipe: Some("ai-news-crawler".to_string()),
                agent: None,
                depends_on: vec![],
            },
            StageConfig {
                id: "bundle".to_string(),
                name: None,
                description: None,
                tool: Some("create_output_bundle".to_string()),
                recipe: None,
                agent: None,
                depends_on: vec!["crawl".to_string()],
            },
        ];
        let lines: Vec<String> = format_workflow(&Workflow::from_stages(&stages))
            .iter()
            .map(|l| plain(l))
            .collect();
        assert_eq!(lines[0], "  1. crawl → recipe ai-news-crawler");
        assert_eq!(lines[1], "  2. bundle → tool create_output_bundle (after crawl)");
    }
}
