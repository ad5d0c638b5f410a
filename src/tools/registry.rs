//! Recipe-level tool registry

use crate::tools::{FnTool, Tool, ToolError};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Mapping from tool name to tool, in registration order.
///
/// Registering a name twice replaces the earlier tool in place. Lookups of
/// unknown names return `None`. Registries are filled once and then only
/// read, so there is no locking.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            debug!("Tool '{}' re-registered, previous registration replaced", name);
        }
        self
    }

    /// Register a synchronous closure as a tool
    pub fn register_fn<F>(&mut self, name: &str, description: &str, func: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register(FnTool::new(name, description, func))
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tools in registration order
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name.
    ///
    /// Returns `None` for an unknown name. Tool failures come back as an
    /// `{"error": ...}` value rather than an `Err`.
    pub async fn invoke(&self, name: &str, args: &Value) -> Option<Value> {
        let tool = self.get(name)?;
        debug!("Invoking tool {}", name);

        let value = match tool.call(args).await {
            Ok(value) => value,
            Err(e) => {
                error!("Tool {} failed: {}", name, e);
                e.to_payload()
            }
        };
        Some(value)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}
