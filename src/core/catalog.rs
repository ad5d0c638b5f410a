//! Template catalog - discovers recipe templates on disk

use crate::core::{config::RecipeConfig, workflow::Workflow};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Descriptor file names, in lookup order
pub const DESCRIPTOR_FILES: [&str; 2] = ["recipe.yaml", "TEMPLATE.yaml"];

/// Environment variable overriding the templates directory
pub const TEMPLATES_ENV: &str = "AGENT_RECIPES_TEMPLATES";

/// A loaded recipe template
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Template name (directory name)
    pub name: String,

    /// Template directory
    pub dir: PathBuf,

    /// Parsed descriptor
    pub config: RecipeConfig,

    /// Stage plan
    pub workflow: Workflow,
}

impl Recipe {
    /// Recipe config as default tool arguments
    pub fn tool_defaults(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.config.config_json()
    }

    /// Merge caller arguments over the recipe's config defaults
    pub fn tool_arguments(&self, args: serde_json::Value) -> Result<serde_json::Value> {
        let mut merged = self.tool_defaults()?;
        match args {
            serde_json::Value::Object(map) => merged.extend(map),
            serde_json::Value::Null => {}
            other => anyhow::bail!("Tool arguments must be a JSON object, got {}", other),
        }
        Ok(serde_json::Value::Object(merged))
    }
}

/// Directory of recipe templates, one subdirectory per template
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    root: PathBuf,
    names: Vec<String>,
}

impl TemplateCatalog {
    /// Open a templates directory
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let entries = std::fs::read_dir(&root)
            .with_context(|| format!("Failed to read templates directory {}", root.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.starts_with('.') => names.push(name),
                Ok(_) => {}
                Err(name) => warn!("Skipping template with non UTF-8 name: {:?}", name),
            }
        }
        names.sort();

        debug!("Found {} templates in {}", names.len(), root.display());
        Ok(Self { root, names })
    }

    /// Templates directory from the environment, falling back to `./templates`
    pub fn default_dir() -> PathBuf {
        std::env::var_os(TEMPLATES_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("templates"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Template names, sorted
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Directory of a template (may not exist)
    pub fn template_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Descriptor path of a template, if one exists
    pub fn descriptor_path(&self, name: &str) -> Option<PathBuf> {
        let dir = self.template_dir(name);
        DESCRIPTOR_FILES
            .iter()
            .map(|file| dir.join(file))
            .find(|path| path.is_file())
    }

    /// Load and validate a template
    pub fn load(&self, name: &str) -> Result<Recipe> {
        if !self.contains(name) {
            anyhow::bail!("Template '{}' not found in {}", name, self.root.display());
        }

        let path = self.descriptor_path(name).with_context(|| {
            format!(
                "Template '{}' has no {}",
                name,
                DESCRIPTOR_FILES.join(" or ")
            )
        })?;

        let config = RecipeConfig::from_file(&path)?;
        if config.name != name {
            warn!(
                "Template directory '{}' declares recipe name '{}'",
                name, config.name
            );
        }

        let workflow = Workflow::from_stages(config.workflow_stages());
        Ok(Recipe {
            name: name.to_string(),
            dir: self.template_dir(name),
            config,
            workflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_template(root: &Path, name: &str, file: &str, body: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn test_open_lists_sorted_directories() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "b-recipe", "recipe.yaml", "name: b-recipe\n");
        write_template(tmp.path(), "a-recipe", "recipe.yaml", "name: a-recipe\n");
        std::fs::write(tmp.path().join("README.md"), "not a template").unwrap();

        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        assert_eq!(catalog.names(), &["a-recipe", "b-recipe"]);
        assert!(catalog.contains("a-recipe"));
        assert!(!catalog.contains("README.md"));
    }

    #[test]
    fn test_template_yaml_fallback() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "shorts", "TEMPLATE.yaml", "name: shorts\n");

        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        let recipe = catalog.load("shorts").unwrap();
        assert_eq!(recipe.config.name, "shorts");
        assert!(recipe.dir.ends_with("shorts"));
    }

    #[test]
    fn test_load_missing_template_fails() {
        let tmp = TempDir::new().unwrap();
        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        assert!(catalog.load("nope").is_err());
    }

    #[test]
    fn test_load_without_descriptor_fails() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        let err = catalog.load("empty").unwrap_err().to_string();
        assert!(err.contains("recipe.yaml"));
    }

    #[test]
    fn test_tool_arguments_override_config() {
        let tmp = TempDir::new().unwrap();
        write_template(
            tmp.path(),
            "crawler",
            "recipe.yaml",
            "name: crawler\nconfig:\n  max_articles: 20\n  sources: [hackernews]\n",
        );

        let catalog = TemplateCatalog::open(tmp.path()).unwrap();
        let recipe = catalog.load("crawler").unwrap();
        let args = recipe
            .tool_arguments(serde_json::json!({ "max_articles": 3 }))
            .unwrap();

        assert_eq!(args["max_articles"], serde_json::json!(3));
        assert_eq!(args["sources"], serde_json::json!(["hackernews"]));
        assert!(recipe.tool_arguments(serde_json::json!([1, 2])).is_err());
    }
}
