//! `amp mutate`: converge one DeploymentConfig manifest toward another

use std::sync::Arc;

use amp_common::crd::DeploymentConfig;
use amp_common::{object_info, DiffReporter, Error, Result};
use amp_reconcilers::{DeploymentConfigMutator, Mutator};
use tracing::info;

/// Result of running a mutator over two manifests
#[derive(Debug)]
pub struct MutateOutcome {
    /// Whether the existing object was modified
    pub changed: bool,
    /// The existing object after mutation
    pub existing: DeploymentConfig,
}

impl MutateOutcome {
    /// Text to print: the converged manifest, or a one-line in-sync notice
    pub fn render(&self) -> Result<String> {
        if self.changed {
            serde_yaml::to_string(&self.existing)
                .map_err(|e| Error::serialization_for_kind("DeploymentConfig", e.to_string()))
        } else {
            Ok(format!("{} in sync\n", object_info(&self.existing)))
        }
    }
}

fn parse_deployment_config(yaml: &str, what: &str) -> Result<DeploymentConfig> {
    serde_yaml::from_str(yaml).map_err(|e| {
        Error::serialization_for_kind("DeploymentConfig", format!("{what} manifest: {e}"))
    })
}

/// Parse both manifests and run the named mutator pipeline over them
///
/// # Errors
///
/// - `Error::Serialization` if either manifest is not a DeploymentConfig
/// - `Error::Internal` if `mutator` names no known pipeline
/// - whatever the pipeline returns, including the fatal
///   `Error::InvariantViolation`
pub fn mutate_manifests(
    mutator: &str,
    existing_yaml: &str,
    desired_yaml: &str,
    reporter: Arc<dyn DiffReporter>,
) -> Result<MutateOutcome> {
    let mutator = DeploymentConfigMutator::by_name(mutator, reporter).ok_or_else(|| {
        Error::internal_with_context("cli", format!("unknown mutator '{mutator}'"))
    })?;

    let mut existing = parse_deployment_config(existing_yaml, "existing")?;
    let desired = parse_deployment_config(desired_yaml, "desired")?;

    let changed = mutator.mutate(&mut existing, &desired)?;
    info!(
        object = %object_info(&existing),
        mutator = mutator.name(),
        changed,
        "mutation complete"
    );

    Ok(MutateOutcome { changed, existing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use amp_common::{NoopDiffReporter, RecordingDiffReporter};
    use rstest::rstest;

    fn manifest(replicas: i32, cpu: &str, containers: usize) -> String {
        let mut yaml = format!(
            r#"
apiVersion: apps.openshift.io/v1
kind: DeploymentConfig
metadata:
  name: apicast-production
spec:
  replicas: {replicas}
  template:
    spec:
      containers:
"#
        );
        for i in 0..containers {
            yaml.push_str(&format!(
                r#"        - name: apicast-{i}
          resources:
            requests:
              cpu: "{cpu}"
"#
            ));
        }
        yaml
    }

    fn noop() -> Arc<dyn DiffReporter> {
        Arc::new(NoopDiffReporter)
    }

    #[test]
    fn in_sync_manifests_print_notice() {
        let outcome =
            mutate_manifests("generic", &manifest(2, "1", 1), &manifest(2, "1000m", 1), noop())
                .unwrap();
        assert!(!outcome.changed);
        assert_eq!(
            outcome.render().unwrap(),
            "DeploymentConfig/apicast-production in sync\n"
        );
    }

    #[rstest]
    #[case::generic("generic", true)]
    #[case::resources("resources", false)]
    #[case::resources_affinity_tolerations("resources-affinity-tolerations", false)]
    fn replica_drift_only_matters_to_generic(#[case] mutator: &str, #[case] changed: bool) {
        let outcome =
            mutate_manifests(mutator, &manifest(1, "1", 1), &manifest(3, "1", 1), noop()).unwrap();
        assert_eq!(outcome.changed, changed);
    }

    #[test]
    fn changed_manifest_prints_converged_yaml() {
        let reporter = Arc::new(RecordingDiffReporter::new());
        let outcome = mutate_manifests(
            "resources",
            &manifest(1, "500m", 1),
            &manifest(1, "2", 1),
            reporter.clone(),
        )
        .unwrap();
        assert!(outcome.changed);
        assert_eq!(reporter.len(), 1);

        let rendered = outcome.render().unwrap();
        let reparsed: DeploymentConfig = serde_yaml::from_str(&rendered).unwrap();
        let requests = reparsed.containers()[0]
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .unwrap();
        assert_eq!(requests["cpu"].0, "2");
    }

    #[test]
    fn malformed_manifest_is_a_serialization_error() {
        let err = mutate_manifests("generic", "spec: [", &manifest(1, "1", 1), noop()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(err.to_string().contains("existing manifest"));
    }

    #[test]
    fn unknown_mutator_is_rejected() {
        let err = mutate_manifests("everything", &manifest(1, "1", 1), &manifest(1, "1", 1), noop())
            .unwrap_err();
        assert_eq!(err.context(), Some("cli"));
    }

    #[test]
    fn two_desired_containers_is_fatal() {
        let err = mutate_manifests("generic", &manifest(1, "1", 1), &manifest(1, "1", 2), noop())
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
