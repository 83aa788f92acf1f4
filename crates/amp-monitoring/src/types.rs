//! Typed monitoring manifests
//!
//! Minimal models of the Prometheus Operator and Grafana Operator custom
//! resources the operator emits. Only fields that are actually set are
//! modeled; unset optional fields are omitted when serializing.

use std::collections::BTreeMap;

use amp_common::kube_utils::{HasApiResource, ObjectMeta};
use serde::{Deserialize, Serialize};

// =============================================================================
// PodMonitor
// =============================================================================

/// Prometheus Operator PodMonitor
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMonitor {
    /// API version
    #[serde(default = "PodMonitor::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "PodMonitor::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: PodMonitorSpec,
}

impl HasApiResource for PodMonitor {
    const API_VERSION: &'static str = "monitoring.coreos.com/v1";
    const KIND: &'static str = "PodMonitor";
}

impl PodMonitor {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a new PodMonitor
    pub fn new(metadata: ObjectMeta, spec: PodMonitorSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }
}

/// PodMonitor spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMonitorSpec {
    /// Endpoints scraped on every selected pod
    pub pod_metrics_endpoints: Vec<PodMetricsEndpoint>,
    /// Pods to scrape
    pub selector: LabelSelector,
}

/// A single scrape endpoint on a pod
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PodMetricsEndpoint {
    /// Named container port
    pub port: String,
    /// HTTP path serving metrics
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// URL scheme (http or https)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheme: String,
}

/// Equality-based label selector
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Labels a pod must carry
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

// =============================================================================
// PrometheusRule
// =============================================================================

/// Prometheus Operator PrometheusRule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusRule {
    /// API version
    #[serde(default = "PrometheusRule::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "PrometheusRule::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: PrometheusRuleSpec,
}

impl HasApiResource for PrometheusRule {
    const API_VERSION: &'static str = "monitoring.coreos.com/v1";
    const KIND: &'static str = "PrometheusRule";
}

impl PrometheusRule {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a new PrometheusRule
    pub fn new(metadata: ObjectMeta, spec: PrometheusRuleSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }
}

/// PrometheusRule spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PrometheusRuleSpec {
    /// Rule groups
    pub groups: Vec<RuleGroup>,
}

/// A named group of rules evaluated together
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleGroup {
    /// Group name
    pub name: String,
    /// Rules in evaluation order
    pub rules: Vec<Rule>,
}

/// An alerting rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Alert name
    pub alert: String,
    /// PromQL expression
    pub expr: String,
    /// How long the expression must hold before firing
    #[serde(rename = "for", default, skip_serializing_if = "String::is_empty")]
    pub for_duration: String,
    /// Labels attached to the alert
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Human-readable annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

// =============================================================================
// GrafanaDashboard
// =============================================================================

/// Grafana Operator GrafanaDashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrafanaDashboard {
    /// API version
    #[serde(default = "GrafanaDashboard::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "GrafanaDashboard::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: GrafanaDashboardSpec,
}

impl HasApiResource for GrafanaDashboard {
    const API_VERSION: &'static str = "integreatly.org/v1alpha1";
    const KIND: &'static str = "GrafanaDashboard";
}

impl GrafanaDashboard {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a new GrafanaDashboard
    pub fn new(metadata: ObjectMeta, spec: GrafanaDashboardSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }
}

/// GrafanaDashboard spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GrafanaDashboardSpec {
    /// Dashboard model as a JSON document
    pub json: String,
    /// Dashboard file name inside Grafana
    pub name: String,
}

// =============================================================================
// MonitoringManifest
// =============================================================================

/// Any of the monitoring manifests, for emitting them as one stream
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MonitoringManifest {
    /// A PodMonitor
    PodMonitor(PodMonitor),
    /// A PrometheusRule
    PrometheusRule(PrometheusRule),
    /// A GrafanaDashboard
    GrafanaDashboard(GrafanaDashboard),
}

impl MonitoringManifest {
    /// `Kind/name` identifier for logging
    pub fn object_info(&self) -> String {
        let (kind, meta) = match self {
            Self::PodMonitor(m) => (&m.kind, &m.metadata),
            Self::PrometheusRule(r) => (&r.kind, &r.metadata),
            Self::GrafanaDashboard(d) => (&d.kind, &d.metadata),
        };
        format!("{}/{}", kind, meta.name)
    }
}

impl From<PodMonitor> for MonitoringManifest {
    fn from(m: PodMonitor) -> Self {
        Self::PodMonitor(m)
    }
}

impl From<PrometheusRule> for MonitoringManifest {
    fn from(r: PrometheusRule) -> Self {
        Self::PrometheusRule(r)
    }
}

impl From<GrafanaDashboard> for MonitoringManifest {
    fn from(d: GrafanaDashboard) -> Self {
        Self::GrafanaDashboard(d)
    }
}
