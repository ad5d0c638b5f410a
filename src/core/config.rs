//! Recipe descriptor loaded from `recipe.yaml`

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::Path;
use anyhow::{Context, Result};

/// Top-level recipe descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Recipe name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Recipe version (optional)
    #[serde(default)]
    pub version: Option<String>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Recipe configuration, passed to tools as default arguments
    #[serde(default)]
    pub config: Mapping,

    /// Input schema (free-form)
    #[serde(default)]
    pub input: Option<Value>,

    /// Workflow stages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workflow: Vec<StageConfig>,

    /// Alternative name for `workflow`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<StageConfig>,

    /// Alternative name for `workflow`, used by agent-centric recipes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<StageConfig>,
}

/// A single workflow stage as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Unique stage identifier
    pub id: String,

    /// Human-readable stage name
    #[serde(default)]
    pub name: Option<String>,

    /// Optional stage description
    #[serde(default)]
    pub description: Option<String>,

    /// Tool from this recipe's registry
    #[serde(default)]
    pub tool: Option<String>,

    /// Another recipe in the catalog
    #[serde(default)]
    pub recipe: Option<String>,

    /// Agent role handled by the external runtime
    #[serde(default)]
    pub agent: Option<String>,

    /// Stage IDs this stage depends on
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl RecipeConfig {
    /// Load a recipe descriptor from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid recipe descriptor {}", path.display()))
    }

    /// Parse a recipe descriptor from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RecipeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Recipe name must not be empty");
        }

        let stages = self.workflow_stages();

        let mut seen_ids = HashSet::new();
        for stage in stages {
            if !seen_ids.insert(&stage.id) {
                anyhow::bail!("Duplicate stage ID: {}", stage.id);
            }
        }

        for stage in stages {
            for dep in &stage.depends_on {
                if !seen_ids.contains(dep) {
                    anyhow::bail!(
                        "Stage '{}' depends on non-existent stage '{}'",
                        stage.id,
                        dep
                    );
                }
            }

            let targets = [&stage.tool, &stage.recipe, &stage.agent]
                .iter()
                .filter(|t| t.is_some())
                .count();
            if targets > 1 {
                anyhow::bail!(
                    "Stage '{}' must name at most one of tool, recipe or agent",
                    stage.id
                );
            }
        }

        self.check_cycles()?;

        Ok(())
    }

    /// Stages from the first non-empty of `workflow`, `pipeline`, `agents`
    pub fn workflow_stages(&self) -> &[StageConfig] {
        [&self.workflow, &self.pipeline, &self.agents]
            .into_iter()
            .find(|stages| !stages.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any of `keys` is present in the config section
    pub fn config_has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.config.contains_key(*key))
    }

    /// First of `keys` holding a list, rendered as strings
    pub fn config_list(&self, keys: &[&str]) -> Option<Vec<String>> {
        keys.iter().find_map(|key| match self.config.get(*key) {
            Some(Value::Sequence(items)) => Some(items.iter().map(render_scalar).collect()),
            _ => None,
        })
    }

    /// Whether the descriptor declares an input section
    pub fn has_input(&self) -> bool {
        matches!(&self.input, Some(value) if !value.is_null())
    }

    /// Config section as a JSON object, used as default tool arguments
    pub fn config_json(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(&self.config)
            .with_context(|| format!("Config of recipe '{}' is not JSON-compatible", self.name))?
        {
            serde_json::Value::Object(map) => Ok(map),
            _ => anyhow::bail!("Config of recipe '{}' is not a mapping", self.name),
        }
    }

    /// Check for cycles in the stage dependency graph
    fn check_cycles(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut recursion_stack = HashSet::new();

        for stage in self.workflow_stages() {
            if !visited.contains(&stage.id) {
                self.dfs_check(&stage.id, &mut visited, &mut recursion_stack)?;
            }
        }

        Ok(())
    }

    fn dfs_check(
        &self,
        stage_id: &str,
        visited: &mut HashSet<String>,
        recursion_stack: &mut HashSet<String>,
    ) -> Result<()> {
        visited.insert(stage_id.to_string());
        recursion_stack.insert(stage_id.to_string());

        if let Some(stage) = self.workflow_stages().iter().find(|s| s.id == stage_id) {
            for dep in &stage.depends_on {
                if recursion_stack.contains(dep) {
                    anyhow::bail!("Cycle detected in workflow involving stage '{}'", dep);
                }
                if !visited.contains(dep) {
                    self.dfs_check(dep, visited, recursion_stack)?;
                }
            }
        }

        recursion_stack.remove(stage_id);
        Ok(())
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}
