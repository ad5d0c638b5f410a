//! agent-recipes - recipe templates and tools for an AI content pipeline

pub mod cli;
pub mod core;
pub mod tools;

// Re-export commonly used types
pub use crate::core::{check_catalog, CheckReport, Recipe, RecipeConfig, Settings, TemplateCatalog, Workflow};
pub use tools::{registry_for, Tool, ToolError, ToolRegistry};
