//! Core domain models for recipe templates
//!
//! Descriptors, stage plans, template discovery, settings and the
//! structural checks over the advertised templates.

pub mod catalog;
pub mod checks;
pub mod config;
pub mod settings;
pub mod workflow;

pub use catalog::{Recipe, TemplateCatalog};
pub use checks::{check_catalog, CheckReport, Layer, TemplateCheck};
pub use config::{RecipeConfig, StageConfig};
pub use settings::Settings;
pub use workflow::{Stage, StageTarget, Workflow};
