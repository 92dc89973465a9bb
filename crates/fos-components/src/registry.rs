//! Component Registry
//!
//! Named component schemas, used to delegate slots and render components by
//! name. Lookups happen when a slot is declared, never per element.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ComponentError, Result};
use crate::schema::Schema;

/// Component registry
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    definitions: IndexMap<String, Arc<Schema>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a component
    pub fn define(&mut self, name: &str, schema: Arc<Schema>) -> Result<()> {
        if !Self::is_valid_name(name) {
            return Err(ComponentError::InvalidComponentName(name.to_string()));
        }

        if self.definitions.contains_key(name) {
            return Err(ComponentError::DuplicateComponent(name.to_string()));
        }

        tracing::debug!("Defined component {} ({})", name, schema.name());
        self.definitions.insert(name.to_string(), schema);
        Ok(())
    }

    /// Get component schema by name
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.definitions.get(name)
    }

    /// Get component schema by name, failing when undefined
    pub fn resolve(&self, name: &str) -> Result<Arc<Schema>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownComponent(name.to_string()))
    }

    /// Check if component is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Defined component names, sorted
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate component name: `/`-separated segments, each starting with
    /// a lowercase letter and made of lowercase letters, digits and `_`
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name.split('/').all(|segment| {
                segment.chars().next().is_some_and(|c| c.is_ascii_lowercase())
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            })
    }
}
