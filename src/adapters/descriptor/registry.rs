//! Descriptor registry
//!
//! Holds descriptor documents by exchange id and resolves the effective
//! descriptor by walking the `parent` links and merging each fragment
//! over its parent's resolved descriptor.

use std::collections::HashMap;

use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

use super::inherit::{merge, PartialDescriptor};
use super::types::ExchangeDescriptor;

const LIQUI_DESCRIPTOR: &str = include_str!("../../../descriptors/liqui.yaml");
const WEX_DESCRIPTOR: &str = include_str!("../../../descriptors/wex.yaml");

/// Key naming the parent exchange inside a descriptor document
const PARENT_KEY: &str = "parent";

#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    documents: HashMap<String, PartialDescriptor>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the descriptors shipped in `descriptors/`
    pub fn builtin() -> ExchangeResult<Self> {
        let mut registry = Self::new();
        registry.register_yaml("liqui", LIQUI_DESCRIPTOR)?;
        registry.register_yaml("wex", WEX_DESCRIPTOR)?;
        Ok(registry)
    }

    pub fn register(&mut self, id: &str, document: PartialDescriptor) {
        self.documents.insert(id.to_string(), document);
    }

    pub fn register_yaml(&mut self, id: &str, yaml: &str) -> ExchangeResult<()> {
        let document = PartialDescriptor::from_yaml_str(yaml)
            .map_err(|e| ExchangeError::InvalidDescriptor(format!("'{}': {}", id, e)))?;
        self.register(id, document);
        Ok(())
    }

    /// Registered exchange ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve the effective descriptor for `id`
    pub fn resolve(&self, id: &str) -> ExchangeResult<ExchangeDescriptor> {
        let mut chain = Vec::new();
        self.resolve_chain(id, &mut chain)
    }

    fn resolve_chain(
        &self,
        id: &str,
        chain: &mut Vec<String>,
    ) -> ExchangeResult<ExchangeDescriptor> {
        if chain.iter().any(|seen| seen == id) {
            chain.push(id.to_string());
            return Err(ExchangeError::InvalidDescriptor(format!(
                "parent cycle: {}",
                chain.join(" -> ")
            )));
        }
        chain.push(id.to_string());

        let mut document = self
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| ExchangeError::InvalidDescriptor(format!("unknown exchange '{}'", id)))?;

        let descriptor = match document.take(PARENT_KEY) {
            Some(Value::String(parent_id)) => {
                let parent = self.resolve_chain(&parent_id, chain)?;
                merge(&parent, &document)?
            }
            Some(other) => {
                return Err(ExchangeError::InvalidDescriptor(format!(
                    "'{}': parent must be an exchange id, got {}",
                    id, other
                )))
            }
            None => {
                let descriptor: ExchangeDescriptor =
                    serde_json::from_value(document.into_value()).map_err(|e| {
                        ExchangeError::InvalidDescriptor(format!("'{}': {}", id, e))
                    })?;
                descriptor.validate()?;
                descriptor
            }
        };

        if descriptor.id != id {
            return Err(ExchangeError::InvalidDescriptor(format!(
                "document registered as '{}' describes '{}'",
                id, descriptor.id
            )));
        }

        Ok(descriptor)
    }
}
