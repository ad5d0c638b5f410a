//! CLI command definitions

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// List templates in the catalog
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show a single template
#[derive(Debug, Args, Clone)]
pub struct ShowCommand {
    /// Template name
    pub name: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a recipe descriptor
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Template name in the catalog
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub name: Option<String>,

    /// Path to a recipe YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Check the advertised templates
#[derive(Debug, Args, Clone)]
pub struct CheckCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Call a tool from a template's registry
#[derive(Debug, Args, Clone)]
pub struct ToolCommand {
    /// Template name
    pub template: String,

    /// Tool name
    pub tool: String,

    /// Argument overrides (key=value); values are parsed as JSON when possible
    #[arg(long, value_parser = parse_key_value)]
    pub arg: Vec<(String, String)>,

    /// Arguments as a JSON object
    #[arg(long)]
    pub args: Option<String>,
}

impl ToolCommand {
    /// Build the tool's argument object from `--args` and `--arg`
    pub fn arguments(&self) -> Result<Value> {
        let mut map = match &self.args {
            Some(raw) => match serde_json::from_str::<Value>(raw).context("--args is not valid JSON")? {
                Value::Object(map) => map,
                other => anyhow::bail!("--args must be a JSON object, got {}", other),
            },
            None => Map::new(),
        };

        for (key, value) in &self.arg {
            // Bare words stay strings: --arg query=ai
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            map.insert(key.clone(), value);
        }

        Ok(Value::Object(map))
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
