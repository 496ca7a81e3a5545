use crate::Overrides;
use anyhow::Context;
use clusterflow_config::{ClusterflowConfig, find_config_file, parse_extra_var};

/// Read the config file, layer CLI overrides on top and validate the result
pub fn load(overrides: &Overrides) -> anyhow::Result<ClusterflowConfig> {
    let path = match &overrides.config {
        Some(path) => path.clone(),
        None => find_config_file()?,
    };

    let mut config = ClusterflowConfig::read(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    apply_overrides(&mut config, overrides)?;
    config.validate()?;

    tracing::info!(
        path = %path.display(),
        cluster = %config.common.cluster_name,
        provider = %config.deployer.target_provider,
        "Loaded config"
    );
    Ok(config)
}

fn apply_overrides(config: &mut ClusterflowConfig, overrides: &Overrides) -> anyhow::Result<()> {
    if let Some(provider) = &overrides.provider {
        config.deployer.target_provider = provider.clone();
    }
    if let Some(name) = &overrides.cluster_name {
        config.common.cluster_name = name.clone();
    }
    if let Some(retries) = overrides.retry_on_tf_failure {
        config.deployer.retry_on_tf_failure = retries;
    }
    if overrides.break_on_upfail {
        config.deployer.break_on_upfail = true;
    }
    if overrides.ignore_cluster_dir {
        config.deployer.ignore_cluster_dir = true;
    }
    for raw in &overrides.extra_vars {
        let (key, value) = parse_extra_var(raw)?;
        config.deployer.extra_vars.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = ClusterflowConfig::from_yaml_str(
            "common:\n  cluster_name: from-file\ndeployer:\n  retry_on_tf_failure: 4\n  extra_vars:\n    runtime: crio\n",
        )
        .unwrap();
        let overrides = Overrides {
            provider: Some("vpc".into()),
            cluster_name: Some("from-cli".into()),
            retry_on_tf_failure: Some(0),
            break_on_upfail: true,
            extra_vars: vec!["runtime=containerd".into(), "k8s_version=v1.31.0".into()],
            ..Default::default()
        };

        apply_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.deployer.target_provider, "vpc");
        assert_eq!(config.common.cluster_name, "from-cli");
        assert_eq!(config.deployer.retry_on_tf_failure, 0);
        assert!(config.deployer.break_on_upfail);
        assert!(!config.deployer.ignore_cluster_dir);
        assert_eq!(config.deployer.extra_vars["runtime"], "containerd");
        assert_eq!(config.deployer.extra_vars["k8s_version"], "v1.31.0");
    }

    #[test]
    fn test_unset_overrides_keep_file_values() {
        let mut config = ClusterflowConfig::from_yaml_str(
            "common:\n  cluster_name: from-file\ndeployer:\n  break_on_upfail: true\n",
        )
        .unwrap();

        apply_overrides(&mut config, &Overrides::default()).unwrap();

        assert_eq!(config.common.cluster_name, "from-file");
        assert_eq!(config.deployer.target_provider, "powervs");
        assert!(config.deployer.break_on_upfail);
    }

    #[test]
    fn test_malformed_extra_var() {
        let mut config = ClusterflowConfig::default();
        let overrides = Overrides {
            extra_vars: vec!["novalue".into()],
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &overrides).is_err());
    }

    #[test]
    fn test_load_applies_overrides_before_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("clusterflow.yaml");
        std::fs::write(&path, "vpc:\n  region: us-south\n").unwrap();

        let overrides = Overrides {
            config: Some(path),
            cluster_name: Some("ci-k8s".into()),
            ..Default::default()
        };
        let config = load(&overrides).unwrap();
        assert_eq!(config.common.cluster_name, "ci-k8s");
        assert_eq!(config.vpc.region, "us-south");
    }
}
