//! OpenShift `apps.openshift.io/v1` DeploymentConfig
//!
//! Only the fields the operator builds or reconciles are modeled. The pod
//! template reuses the k8s-openapi core types so affinity, tolerations and
//! container resources compare with the same structure the API server uses.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Affinity, Container, PodSpec, PodTemplateSpec, Toleration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Spec for a DeploymentConfig
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    plural = "deploymentconfigs",
    shortname = "dc",
    namespaced,
    status = "DeploymentConfigStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// Desired number of running pods
    #[serde(default)]
    pub replicas: i32,

    /// Label query over pods that should match the replica count
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,

    /// Pod template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,

    /// Seconds a new pod must be ready before it counts as available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Number of old replication controllers to retain for rollback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Pause rollouts triggered by config changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    /// Run deployments as tests that scale back to zero afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<bool>,
}

/// Status for a DeploymentConfig
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    /// Most recent deployment version
    #[serde(default)]
    pub latest_version: i64,

    /// Generation most recently observed by the deployment controller
    #[serde(default)]
    pub observed_generation: i64,

    /// Total pods targeted by this config
    #[serde(default)]
    pub replicas: i32,

    /// Pods available for at least minReadySeconds
    #[serde(default)]
    pub available_replicas: i32,
}

impl DeploymentConfig {
    /// Pod spec of the template, if one is set
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.template.as_ref()?.spec.as_ref()
    }

    /// Mutable pod spec, creating an empty template if none exists
    pub fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec
            .template
            .get_or_insert_with(PodTemplateSpec::default)
            .spec
            .get_or_insert_with(PodSpec::default)
    }

    /// Containers of the pod template (empty if no template)
    pub fn containers(&self) -> &[Container] {
        self.pod_spec()
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default()
    }

    /// Scheduling affinity of the pod template
    pub fn affinity(&self) -> Option<&Affinity> {
        self.pod_spec()?.affinity.as_ref()
    }

    /// Scheduling tolerations of the pod template
    pub fn tolerations(&self) -> Option<&Vec<Toleration>> {
        self.pod_spec()?.tolerations.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    const ZYNC_DC: &str = r#"
apiVersion: apps.openshift.io/v1
kind: DeploymentConfig
metadata:
  name: zync
  namespace: 3scale
spec:
  replicas: 2
  selector:
    deploymentConfig: zync
  template:
    metadata:
      labels:
        deploymentConfig: zync
    spec:
      tolerations:
        - key: dedicated
          operator: Equal
          value: api
          effect: NoSchedule
      containers:
        - name: zync
          image: quay.io/3scale/zync:latest
          resources:
            requests:
              cpu: 250m
              memory: 250M
            limits:
              cpu: "1"
              memory: 512Mi
status:
  latestVersion: 3
  replicas: 2
"#;

    #[test]
    fn parses_openshift_manifest() {
        let dc: DeploymentConfig = serde_yaml::from_str(ZYNC_DC).unwrap();
        assert_eq!(dc.metadata.name.as_deref(), Some("zync"));
        assert_eq!(dc.spec.replicas, 2);
        assert_eq!(dc.spec.selector["deploymentConfig"], "zync");
        assert_eq!(dc.containers().len(), 1);
        assert_eq!(dc.tolerations().map(Vec::len), Some(1));
        assert!(dc.affinity().is_none());

        let resources = dc.containers()[0].resources.as_ref().unwrap();
        let requests = resources.requests.as_ref().unwrap();
        assert_eq!(requests["cpu"].0, "250m");
        assert_eq!(dc.status.as_ref().unwrap().latest_version, 3);
    }

    #[test]
    fn resource_identity() {
        assert_eq!(DeploymentConfig::kind(&()), "DeploymentConfig");
        assert_eq!(DeploymentConfig::group(&()), "apps.openshift.io");
        assert_eq!(DeploymentConfig::api_version(&()), "apps.openshift.io/v1");
        assert_eq!(DeploymentConfig::plural(&()), "deploymentconfigs");
    }

    #[test]
    fn accessors_tolerate_missing_template() {
        let dc = DeploymentConfig::new("empty", DeploymentConfigSpec::default());
        assert!(dc.pod_spec().is_none());
        assert!(dc.containers().is_empty());
        assert!(dc.affinity().is_none());
        assert!(dc.tolerations().is_none());
    }

    #[test]
    fn pod_spec_mut_creates_template() {
        let mut dc = DeploymentConfig::new("empty", DeploymentConfigSpec::default());
        dc.pod_spec_mut().tolerations = Some(vec![]);
        assert!(dc.spec.template.is_some());
        assert_eq!(dc.tolerations().map(Vec::len), Some(0));
    }

    #[test]
    fn serialization_omits_unset_fields() {
        let dc = DeploymentConfig::new(
            "zync",
            DeploymentConfigSpec {
                replicas: 1,
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&dc).unwrap();
        assert_eq!(json["spec"], serde_json::json!({"replicas": 1}));
        assert_eq!(json["kind"], "DeploymentConfig");
    }
}
