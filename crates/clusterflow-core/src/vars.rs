//! Playbook variable assembly
//!
//! Variables come from three sources, later ones winning on key collision:
//! provider settings, common settings, then user overrides. The result is a
//! flat string map written once as `extra-vars.json`.

use crate::error::{DeployError, Result};
use clusterflow_cloud::NodeInventory;
use clusterflow_config::CommonConfig;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const EXTRA_VARS_FILE: &str = "extra-vars.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnsibleVars(BTreeMap<String, String>);

impl AnsibleVars {
    /// Merge provider variables, common settings and overrides.
    ///
    /// `extra_cert` is set to the comma-joined master addresses so the
    /// API server certificate covers every control plane node.
    pub fn build(
        provider: &Map<String, Value>,
        common: &CommonConfig,
        inventory: &NodeInventory,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut vars = Self::default();
        vars.overlay("provider", provider)?;

        let mut common = common.clone();
        common.extra_cert = inventory.masters.join(",");
        match serde_json::to_value(&common) {
            Ok(Value::Object(fields)) => vars.overlay("common", &fields)?,
            Ok(_) => {
                return Err(DeployError::Vars(
                    "common settings must serialize to a map".to_string(),
                ));
            }
            Err(e) => return Err(DeployError::Vars(e.to_string())),
        }

        for (key, value) in overrides {
            vars.0.insert(key.clone(), value.clone());
        }
        Ok(vars)
    }

    fn overlay(&mut self, source: &str, fields: &Map<String, Value>) -> Result<()> {
        for (key, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(DeployError::Vars(format!(
                        "{} setting '{}' is not a scalar",
                        source, key
                    )));
                }
            };
            self.0.insert(key.clone(), value);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write `<workspace>/extra-vars.json`
    pub async fn write(&self, workspace: &Path) -> Result<PathBuf> {
        let path = workspace.join(EXTRA_VARS_FILE);
        let content =
            serde_json::to_string_pretty(&self.0).map_err(|e| DeployError::Vars(e.to_string()))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| DeployError::Vars(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), count = self.len(), "Wrote playbook variables");
        Ok(path)
    }
}
