//! Workflow plan built from a recipe's stages

use crate::core::config::StageConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// What a stage hands its work to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum StageTarget {
    /// A tool in the recipe's own registry
    Tool(String),
    /// Another recipe in the catalog
    Recipe(String),
    /// An agent role resolved by the external runtime
    Agent(String),
    /// Nothing bound (descriptive stage)
    None,
}

/// A single stage of a workflow
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub target: StageTarget,
    pub dependencies: Vec<String>,
}

impl Stage {
    fn from_config(config: &StageConfig) -> Self {
        let target = if let Some(tool) = &config.tool {
            StageTarget::Tool(tool.clone())
        } else if let Some(recipe) = &config.recipe {
            StageTarget::Recipe(recipe.clone())
        } else if let Some(agent) = &config.agent {
            StageTarget::Agent(agent.clone())
        } else {
            StageTarget::None
        };

        Stage {
            id: config.id.clone(),
            name: config.name.clone().unwrap_or_else(|| config.id.clone()),
            target,
            dependencies: config.depends_on.clone(),
        }
    }
}

/// Ordered stage plan. Never executed here; the runtime that consumes
/// recipes owns execution.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    stages: HashMap<String, Stage>,
    execution_order: Vec<String>,
}

impl Workflow {
    /// Build a plan from validated stage configs
    pub fn from_stages(configs: &[StageConfig]) -> Self {
        let stages: HashMap<String, Stage> = configs
            .iter()
            .map(|config| {
                let stage = Stage::from_config(config);
                (stage.id.clone(), stage)
            })
            .collect();

        let execution_order = Self::topological_sort(&stages);

        Workflow {
            stages,
            execution_order,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Get a stage by ID
    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.get(id)
    }

    /// Stage IDs in dependency order
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Stages in dependency order
    pub fn ordered_stages(&self) -> impl Iterator<Item = &Stage> {
        self.execution_order
            .iter()
            .filter_map(|id| self.stages.get(id))
    }

    /// Stages without dependencies, sorted by ID
    pub fn roots(&self) -> Vec<&Stage> {
        let mut roots: Vec<&Stage> = self
            .stages
            .values()
            .filter(|s| s.dependencies.is_empty())
            .collect();
        roots.sort_by(|a, b| a.id.cmp(&b.id));
        roots
    }

    fn topological_sort(stages: &HashMap<String, Stage>) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();

        // Sort for deterministic order
        let mut stage_ids: Vec<_> = stages.keys().cloned().collect();
        stage_ids.sort();

        for stage_id in stage_ids {
            Self::visit(&stage_id, stages, &mut visited, &mut result);
        }

        result
    }

    fn visit(
        stage_id: &str,
        stages: &HashMap<String, Stage>,
        visited: &mut HashSet<String>,
        result: &mut Vec<String>,
    ) {
        if !visited.insert(stage_id.to_string()) {
            return;
        }

        if let Some(stage) = stages.get(stage_id) {
            let mut deps = stage.dependencies.clone();
            deps.sort();
            for dep in &deps {
                Self::visit(dep, stages, visited, result);
            }
        }

        result.push(stage_id.to_string());
    }
}
