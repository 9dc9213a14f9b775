//! Descriptor inheritance by deep merge
//!
//! A derived exchange is described by a fragment laid over its parent's
//! effective descriptor. Mappings merge key by key, every other value
//! (scalars and sequences alike) is replaced wholesale by the fragment.

use serde_json::{Map, Value};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

use super::types::ExchangeDescriptor;

/// Partial descriptor: any subset of descriptor fields, same shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialDescriptor(Map<String, Value>);

impl PartialDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; only mappings are valid fragments
    pub fn from_value(value: Value) -> ExchangeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ExchangeError::InvalidDescriptor(format!(
                "fragment must be a mapping, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> ExchangeResult<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ExchangeError::InvalidDescriptor(format!("YAML parse error: {}", e)))?;
        Self::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove and return a top-level key (used for the `parent` link)
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Recursively overlay `overlay` onto `base`, returning a new value.
///
/// When both sides hold a mapping at the same key the merge recurses;
/// otherwise the overlay value wins. Keys absent from the overlay keep
/// the base value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let value = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Produce the effective descriptor of a derived exchange.
///
/// The parent is left untouched. The result is validated before it is
/// returned, so a fragment that breaks a descriptor invariant fails here
/// rather than at dispatch time.
pub fn merge(
    parent: &ExchangeDescriptor,
    fragment: &PartialDescriptor,
) -> ExchangeResult<ExchangeDescriptor> {
    let base = serde_json::to_value(parent).map_err(|e| {
        ExchangeError::InvalidDescriptor(format!("'{}': cannot serialize parent: {}", parent.id, e))
    })?;

    let merged = deep_merge(&base, &Value::Object(fragment.0.clone()));

    let descriptor: ExchangeDescriptor = serde_json::from_value(merged).map_err(|e| {
        ExchangeError::InvalidDescriptor(format!(
            "fragment over '{}' does not form a descriptor: {}",
            parent.id, e
        ))
    })?;

    descriptor.validate()?;

    tracing::debug!(
        parent = %parent.id,
        child = %descriptor.id,
        overridden = fragment.0.len(),
        "Descriptor merged"
    );

    Ok(descriptor)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
