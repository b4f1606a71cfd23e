//! Tool registry
//!
//! Each handler owns one registry holding its adapters. Registries are
//! populated at startup and read-only afterwards.

use super::{Tool, ToolMetadata};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register an adapter under its metadata name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name.clone();
        tracing::info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        self.tools.values().map(|tool| tool.metadata()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolOutcome, ToolParameter};
    use async_trait::async_trait;
    use serde_json::Value;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata {
                name: self.0.to_string(),
                description: "mô tả".to_string(),
                parameters: vec![ToolParameter {
                    name: "query".to_string(),
                    param_type: "string".to_string(),
                    description: String::new(),
                    required: true,
                }],
            }
        }

        async fn call(&self, _args: Value) -> ToolOutcome {
            ToolOutcome::content("ok")
        }
    }

    #[test]
    fn registration_is_keyed_by_metadata_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("get_weather")));
        registry.register(Arc::new(NamedTool("web_search")));

        assert!(registry.has_tool("get_weather"));
        assert!(!registry.has_tool("place_search"));
        assert!(registry.get("web_search").is_some());

        let mut names = registry.tool_names();
        names.sort();
        assert_eq!(names, ["get_weather", "web_search"]);
        assert_eq!(registry.list_tools().len(), 2);
    }
}
