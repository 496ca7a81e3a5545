//! Canonical node inventory

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Node role in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Masters,
    Workers,
}

impl Role {
    /// Roles in inventory order
    pub const ALL: [Role; 2] = [Role::Masters, Role::Workers];

    /// Identifier as it appears in inventory headers and output keys
    pub fn key(&self) -> &'static str {
        match self {
            Role::Masters => "masters",
            Role::Workers => "workers",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Provider-agnostic role → ordered address mapping.
///
/// The first master is the control plane endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInventory {
    pub masters: Vec<String>,
    pub workers: Vec<String>,
}

impl NodeInventory {
    pub fn new(masters: Vec<String>, workers: Vec<String>) -> Self {
        Self { masters, workers }
    }

    pub fn get(&self, role: Role) -> &[String] {
        match role {
            Role::Masters => &self.masters,
            Role::Workers => &self.workers,
        }
    }

    pub(crate) fn push(&mut self, role: Role, address: String) {
        match role {
            Role::Masters => self.masters.push(address),
            Role::Workers => self.workers.push(address),
        }
    }

    /// First master address
    pub fn control_plane(&self) -> Option<&str> {
        self.masters.first().map(String::as_str)
    }

    /// All addresses, masters first
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.masters
            .iter()
            .chain(self.workers.iter())
            .map(String::as_str)
    }
}

impl std::fmt::Display for NodeInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "masters=[{}] workers=[{}]",
            self.masters.join(", "),
            self.workers.join(", ")
        )
    }
}

/// Accepts IP literals and RFC 1123 host names
pub fn is_valid_address(candidate: &str) -> bool {
    if candidate.parse::<IpAddr>().is_ok() {
        return true;
    }
    is_valid_hostname(candidate)
}

fn is_valid_hostname(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    // a numeric top label means a malformed IP, not a host name
    let top_is_numeric = labels
        .last()
        .is_some_and(|label| label.chars().all(|c| c.is_ascii_digit()));

    labels_ok && !top_is_numeric
}
