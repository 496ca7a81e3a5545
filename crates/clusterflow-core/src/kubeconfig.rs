//! Kubeconfig endpoint rewriting
//!
//! The kubeconfig fetched from the control plane points at an address that is
//! only reachable from inside the cluster network. Every cluster entry is
//! repointed at the public control plane address, keeping everything else in
//! the server URL as written.

use crate::error::KubeconfigError;
use serde_yaml::Value;
use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};
use url::Url;

type Result<T> = std::result::Result<T, KubeconfigError>;

pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

fn invalid(server: &str, reason: impl Into<String>) -> KubeconfigError {
    KubeconfigError::InvalidServer {
        server: server.to_string(),
        reason: reason.into(),
    }
}

/// Replace the host of `server`.
///
/// Scheme, user info, port (or its absence), path, query and fragment are
/// copied verbatim. IPv6 hosts are bracketed.
pub fn replace_host(server: &str, host: &str) -> Result<String> {
    let parsed = Url::parse(server).map_err(|e| invalid(server, e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid(server, "no host"));
    }

    let (scheme, rest) = server
        .split_once("://")
        .ok_or_else(|| invalid(server, "no authority"))?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let (userinfo, hostport) = match authority.rfind('@') {
        Some(at) => authority.split_at(at + 1),
        None => ("", authority),
    };

    let port = match hostport.strip_prefix('[') {
        Some(bracketed) => bracketed
            .split_once(']')
            .and_then(|(_, after)| after.strip_prefix(':')),
        None => hostport.rsplit_once(':').map(|(_, port)| port),
    };

    let mut rewritten = format!("{}://{}", scheme, userinfo);
    if host.parse::<Ipv6Addr>().is_ok() {
        rewritten.push_str(&format!("[{}]", host));
    } else {
        rewritten.push_str(host);
    }
    if let Some(port) = port {
        rewritten.push(':');
        rewritten.push_str(port);
    }
    rewritten.push_str(tail);

    Url::parse(&rewritten).map_err(|e| invalid(&rewritten, e.to_string()))?;
    Ok(rewritten)
}

/// Repoint every `clusters[*].cluster.server` in the file at `host`.
///
/// Nothing is written unless every entry rewrites cleanly. Returns the
/// absolute path of the file.
pub async fn rewrite_kubeconfig(path: &Path, host: &str) -> Result<PathBuf> {
    let io_err = |source| KubeconfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !tokio::fs::try_exists(path).await.map_err(io_err)? {
        return Err(KubeconfigError::NotFound(path.to_path_buf()));
    }

    let content = tokio::fs::read_to_string(path).await.map_err(io_err)?;
    let mut doc: Value =
        serde_yaml::from_str(&content).map_err(|source| KubeconfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rewritten = 0;
    if let Some(clusters) = doc.get_mut("clusters").and_then(Value::as_sequence_mut) {
        for (index, entry) in clusters.iter_mut().enumerate() {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("#{}", index));

            let server = entry
                .get_mut("cluster")
                .and_then(|cluster| cluster.get_mut("server"))
                .ok_or_else(|| KubeconfigError::MissingServer(name.clone()))?;
            let current = server
                .as_str()
                .ok_or_else(|| KubeconfigError::MissingServer(name.clone()))?;

            let updated = replace_host(current, host)?;
            tracing::debug!(cluster = %name, from = current, to = %updated, "Rewriting server");
            *server = Value::String(updated);
            rewritten += 1;
        }
    }

    if rewritten == 0 {
        tracing::warn!(path = %path.display(), "Kubeconfig has no cluster entries");
    }

    let content = serde_yaml::to_string(&doc).map_err(|source| KubeconfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, content).await.map_err(io_err)?;

    let absolute = std::path::absolute(path).map_err(io_err)?;
    tracing::info!(path = %absolute.display(), host, clusters = rewritten, "Updated kubeconfig");
    Ok(absolute)
}
