//! Terraform output model and normalization
//!
//! `terraform output -json` yields one record per output, and each provider's
//! infrastructure description shapes the node lists a little differently:
//!
//! ```text
//! {"masters": "10.0.0.1"}                          bare scalar
//! {"masters": ["10.0.0.1", "10.0.0.4"]}            list
//! {"masters": {"type": [...], "value": [...]}}     output record wrapper
//! ```
//!
//! [`normalize`] turns any of these into a [`NodeInventory`] under a
//! provider-chosen [`ShapePolicy`].

use crate::error::{CloudError, Result};
use crate::inventory::{NodeInventory, Role, is_valid_address};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw `terraform output -json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOutput(Map<String, Value>);

impl RawOutput {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for RawOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for RawOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// How strictly output values must already be list-shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePolicy {
    /// Bare scalars become one-element lists, other shapes are stringified
    ScalarTolerant,
    /// Anything but a list is a contract violation
    Strict,
}

/// Strip `{"value": ...}` output record wrappers
pub fn unwrap_value(value: &Value) -> &Value {
    let mut current = value;
    while let Value::Object(map) = current {
        match map.get("value") {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn coerce_list(key: &str, value: &Value, policy: ShapePolicy) -> Result<Vec<Value>> {
    let value = unwrap_value(value);
    match (policy, value) {
        (_, Value::Array(items)) => Ok(items.clone()),
        (ShapePolicy::ScalarTolerant, Value::String(s)) => Ok(vec![Value::String(s.clone())]),
        (ShapePolicy::ScalarTolerant, other) => Ok(vec![Value::String(other.to_string())]),
        (ShapePolicy::Strict, other) => Err(CloudError::UnexpectedShape {
            key: key.to_string(),
            found: shape_name(other),
        }),
    }
}

/// Convert raw output into the canonical inventory.
///
/// Every output value is shaped under `policy` first, so a strict provider
/// rejects a malformed value even when it is not a node role.
pub fn normalize(raw: &RawOutput, policy: ShapePolicy) -> Result<NodeInventory> {
    let mut lists = Map::new();
    for (key, value) in raw.iter() {
        lists.insert(key.clone(), Value::Array(coerce_list(key, value, policy)?));
    }

    let mut inventory = NodeInventory::default();
    for role in Role::ALL {
        let key = role.key().to_ascii_lowercase();
        let items = match lists.get(&key) {
            Some(Value::Array(items)) => items,
            _ => return Err(CloudError::MissingRole(key)),
        };

        if items.is_empty() {
            return Err(CloudError::EmptyRole(key));
        }

        for (index, item) in items.iter().enumerate() {
            let address = item.as_str().ok_or_else(|| CloudError::NonStringAddress {
                role: key.clone(),
                index,
            })?;
            let address = address.trim();
            if !is_valid_address(address) {
                return Err(CloudError::InvalidAddress {
                    role: key.clone(),
                    address: address.to_string(),
                });
            }
            inventory.push(role, address.to_string());
        }
    }

    tracing::debug!(%inventory, ?policy, "Normalized terraform output");
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOutput {
        RawOutput::from(value)
    }

    #[test]
    fn test_scalar_master_is_coerced() {
        let output = raw(json!({"masters": "10.0.0.1", "workers": ["10.0.0.2", "10.0.0.3"]}));
        let inventory = normalize(&output, ShapePolicy::ScalarTolerant).unwrap();
        assert_eq!(inventory.masters, vec!["10.0.0.1"]);
        assert_eq!(inventory.workers, vec!["10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_order_is_preserved_for_both_policies() {
        let output = raw(json!({
            "masters": ["10.0.0.5", "10.0.0.1"],
            "workers": ["10.0.0.9", "10.0.0.3", "10.0.0.7"],
        }));
        for policy in [ShapePolicy::ScalarTolerant, ShapePolicy::Strict] {
            let inventory = normalize(&output, policy).unwrap();
            assert_eq!(inventory.masters, vec!["10.0.0.5", "10.0.0.1"]);
            assert_eq!(inventory.workers, vec!["10.0.0.9", "10.0.0.3", "10.0.0.7"]);
        }
    }

    #[test]
    fn test_value_wrapper_is_unwrapped() {
        let output = raw(json!({
            "masters": {"sensitive": false, "type": ["tuple", ["string"]], "value": ["10.0.0.1"]},
            "workers": {"value": ["10.0.0.2"]},
        }));
        for policy in [ShapePolicy::ScalarTolerant, ShapePolicy::Strict] {
            let inventory = normalize(&output, policy).unwrap();
            assert_eq!(inventory.masters, vec!["10.0.0.1"]);
            assert_eq!(inventory.workers, vec!["10.0.0.2"]);
        }
    }

    #[test]
    fn test_missing_workers_names_the_role() {
        let output = raw(json!({"masters": ["10.0.0.1"]}));
        for policy in [ShapePolicy::ScalarTolerant, ShapePolicy::Strict] {
            match normalize(&output, policy) {
                Err(CloudError::MissingRole(role)) => assert_eq!(role, "workers"),
                other => panic!("Expected MissingRole, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_strict_rejects_scalar() {
        let output = raw(json!({"masters": "10.0.0.1", "workers": ["10.0.0.2"]}));
        match normalize(&output, ShapePolicy::Strict) {
            Err(CloudError::UnexpectedShape { key, found }) => {
                assert_eq!(key, "masters");
                assert_eq!(found, "string");
            }
            other => panic!("Expected UnexpectedShape, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_malformed_unrelated_output() {
        let output = raw(json!({
            "masters": ["10.0.0.1"],
            "workers": ["10.0.0.2"],
            "network_id": "abc-123",
        }));
        assert!(matches!(
            normalize(&output, ShapePolicy::Strict),
            Err(CloudError::UnexpectedShape { .. })
        ));
        assert!(normalize(&output, ShapePolicy::ScalarTolerant).is_ok());
    }

    #[test]
    fn test_tolerant_stringifies_odd_scalars() {
        let output = raw(json!({"masters": ["10.0.0.1"], "workers": ["10.0.0.2"], "count": 3}));
        let lists = coerce_list("count", output.get("count").unwrap(), ShapePolicy::ScalarTolerant)
            .unwrap();
        assert_eq!(lists, vec![json!("3")]);
        assert!(normalize(&output, ShapePolicy::ScalarTolerant).is_ok());
    }

    #[test]
    fn test_non_string_element_is_rejected() {
        let output = raw(json!({"masters": ["10.0.0.1"], "workers": ["10.0.0.2", 42]}));
        match normalize(&output, ShapePolicy::ScalarTolerant) {
            Err(CloudError::NonStringAddress { role, index }) => {
                assert_eq!(role, "workers");
                assert_eq!(index, 1);
            }
            other => panic!("Expected NonStringAddress, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let output = raw(json!({"masters": ["not an ip"], "workers": ["10.0.0.2"]}));
        assert!(matches!(
            normalize(&output, ShapePolicy::Strict),
            Err(CloudError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_empty_role_is_an_error() {
        let output = raw(json!({"masters": ["10.0.0.1"], "workers": []}));
        match normalize(&output, ShapePolicy::Strict) {
            Err(CloudError::EmptyRole(role)) => assert_eq!(role, "workers"),
            other => panic!("Expected EmptyRole, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_output_display_is_json() {
        let output = raw(json!({"masters": ["10.0.0.1"]}));
        assert_eq!(output.to_string(), r#"{"masters":["10.0.0.1"]}"#);
    }
}
