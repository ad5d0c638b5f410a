//! Shared helpers for the integration tests

#![allow(dead_code)]

use agent_recipes::core::{Recipe, Settings, TemplateCatalog};
use std::path::{Path, PathBuf};

/// The templates shipped with the crate
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

pub fn catalog() -> TemplateCatalog {
    TemplateCatalog::open(templates_dir()).expect("templates directory should open")
}

pub fn load(name: &str) -> Recipe {
    catalog()
        .load(name)
        .unwrap_or_else(|e| panic!("{} should load: {:#}", name, e))
}

/// Settings pointing at the shipped templates and a scratch output directory
pub fn settings(output_dir: &Path) -> Settings {
    Settings::default()
        .with_templates_dir(templates_dir())
        .with_output_dir(output_dir)
}
