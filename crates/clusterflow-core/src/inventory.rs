//! Ansible inventory rendering

use crate::error::{DeployError, Result};
use clusterflow_cloud::NodeInventory;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const INVENTORY_FILE: &str = "hosts";

const INVENTORY_TEMPLATE: &str = "\
[masters]
{% for host in masters %}{{ host }}
{% endfor %}
[workers]
{% for host in workers %}{{ host }}
{% endfor %}
";

/// Renders a [`NodeInventory`] as an INI inventory, one group per role
pub struct InventoryBuilder {
    tera: Tera,
}

impl InventoryBuilder {
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    pub fn render(&mut self, inventory: &NodeInventory) -> Result<String> {
        let mut context = Context::new();
        context.insert("masters", &inventory.masters);
        context.insert("workers", &inventory.workers);

        self.tera
            .render_str(INVENTORY_TEMPLATE, &context)
            .map_err(|e| DeployError::Inventory(format!("template rendering failed: {}", e)))
    }

    /// Render into `<workspace>/hosts`, replacing any previous file
    pub async fn write(&mut self, inventory: &NodeInventory, workspace: &Path) -> Result<PathBuf> {
        let content = self.render(inventory)?;
        let path = workspace.join(INVENTORY_FILE);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| DeployError::Inventory(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            path = %path.display(),
            masters = inventory.masters.len(),
            workers = inventory.workers.len(),
            "Wrote inventory"
        );
        Ok(path)
    }
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
