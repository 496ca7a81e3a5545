//! Instance id/name extraction from terraform output

use crate::error::{CloudError, Result};
use crate::output::{RawOutput, unwrap_value};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MASTER_INSTANCE_LIST: &str = "master_instance_list";
pub const WORKER_INSTANCE_LIST: &str = "worker_instance_list";

/// One provisioned instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Extract the records under `key`.
///
/// Accepts a plain array of `{id, name}` objects or the same array inside a
/// `{"value": [...]}` wrapper. Non-string `id`/`name` fields are dropped.
pub fn extract_instances(raw: &RawOutput, key: &str) -> Result<Vec<InstanceRecord>> {
    let value = raw
        .get(key)
        .ok_or_else(|| CloudError::MissingOutput(key.to_string()))?;

    let items = match unwrap_value(value) {
        Value::Array(items) => items,
        _ => {
            return Err(CloudError::InvalidInstanceData {
                key: key.to_string(),
                reason: "expected a list of instance records".to_string(),
            });
        }
    };

    items
        .iter()
        .map(|item| {
            let record = item
                .as_object()
                .ok_or_else(|| CloudError::InvalidInstanceData {
                    key: key.to_string(),
                    reason: "instance entry is not an object".to_string(),
                })?;
            let field = |name: &str| record.get(name).and_then(Value::as_str).map(String::from);
            Ok(InstanceRecord {
                id: field("id"),
                name: field("name"),
            })
        })
        .collect()
}

/// Masters followed by workers
pub fn extract_all_instances(raw: &RawOutput) -> Result<Vec<InstanceRecord>> {
    let mut instances = extract_instances(raw, MASTER_INSTANCE_LIST)?;
    instances.extend(extract_instances(raw, WORKER_INSTANCE_LIST)?);
    Ok(instances)
}
