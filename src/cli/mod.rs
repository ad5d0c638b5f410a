//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CheckCommand, ListCommand, ShowCommand, ToolCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Recipe templates for an AI content pipeline
#[derive(Debug, Parser, Clone)]
#[command(name = "recipes")]
#[command(author = "Agent Recipes Contributors")]
#[command(version)]
#[command(about = "Inspect, validate and run tools of AI content pipeline recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Templates directory (overrides settings and AGENT_RECIPES_TEMPLATES)
    #[arg(short, long, global = true)]
    pub templates: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List templates in the catalog
    List(ListCommand),

    /// Show a template's descriptor, workflow and tools
    Show(ShowCommand),

    /// Validate a recipe descriptor
    Validate(ValidateCommand),

    /// Check every advertised template
    Check(CheckCommand),

    /// Call a tool of a template
    Tool(ToolCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["recipes", "list", "--json", "-v", "--templates", "/tmp/t"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.templates, Some(PathBuf::from("/tmp/t")));
        assert!(matches!(cli.command, Command::List(ListCommand { json: true })));
    }

    #[test]
    fn test_validate_needs_name_or_file() {
        assert!(Cli::try_parse_from(["recipes", "validate"]).is_err());
        assert!(Cli::try_parse_from(["recipes", "validate", "ai-news-crawler"]).is_ok());
        assert!(Cli::try_parse_from(["recipes", "validate", "--file", "recipe.yaml"]).is_ok());
        assert!(Cli::try_parse_from(["recipes", "validate", "x", "--file", "recipe.yaml"]).is_err());
    }

    #[test]
    fn test_parse_tool_command() {
        let cli = Cli::try_parse_from([
            "recipes",
            "tool",
            "ai-topic-gatherer",
            "tavily_search",
            "--arg",
            "query=ai news",
            "--arg",
            "max_results=3",
        ])
        .unwrap();

        match cli.command {
            Command::Tool(cmd) => {
                assert_eq!(cmd.template, "ai-topic-gatherer");
                assert_eq!(cmd.tool, "tavily_search");
                assert_eq!(cmd.arg.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
