//! Monitoring for zync and zync-que
//!
//! Both deployments expose Prometheus metrics on a container port named
//! `metrics`. Alerts fire when the worker pool stays below five for half an
//! hour.

use std::collections::BTreeMap;

use amp_common::kube_utils::ObjectMeta;
use amp_common::template::TemplateEngine;
use amp_common::{
    Result, LABEL_APP, LABEL_COMPONENT, LABEL_COMPONENT_ELEMENT, MONITORING_KEY,
};
use serde::Serialize;
use tracing::debug;

use crate::types::{
    GrafanaDashboard, GrafanaDashboardSpec, LabelSelector, MonitoringManifest, PodMetricsEndpoint,
    PodMonitor, PodMonitorSpec, PrometheusRule, PrometheusRuleSpec, Rule, RuleGroup,
};

const ZYNC: &str = "zync";
const ZYNC_QUE: &str = "zync-que";

/// Grafana dashboard model; `${namespace}` is filled in at build time
const ZYNC_DASHBOARD_TEMPLATE: &str = include_str!("../assets/zync-grafana-dashboard-1.json.tpl");

/// Options shared by the zync monitoring builders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZyncOptions {
    /// Value of the `app` label on every zync object
    pub app_label: String,
}

impl Default for ZyncOptions {
    fn default() -> Self {
        Self {
            app_label: "3scale-api-management".to_string(),
        }
    }
}

impl ZyncOptions {
    /// Create options with the given `app` label
    pub fn new(app_label: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
        }
    }

    /// Labels carried by zync pods and their monitors
    pub fn common_zync_labels(&self) -> BTreeMap<String, String> {
        self.component_labels(ZYNC)
    }

    /// Labels carried by zync-que pods and their monitors
    pub fn common_zync_que_labels(&self) -> BTreeMap<String, String> {
        self.component_labels(ZYNC_QUE)
    }

    fn component_labels(&self, element: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            (LABEL_APP.to_string(), self.app_label.clone()),
            (LABEL_COMPONENT.to_string(), ZYNC.to_string()),
            (LABEL_COMPONENT_ELEMENT.to_string(), element.to_string()),
        ])
    }
}

// =============================================================================
// PodMonitors
// =============================================================================

fn pod_monitor(name: &str, labels: BTreeMap<String, String>) -> PodMonitor {
    PodMonitor::new(
        ObjectMeta::new(name).with_labels(labels.clone()),
        PodMonitorSpec {
            pod_metrics_endpoints: vec![PodMetricsEndpoint {
                port: "metrics".to_string(),
                path: "/metrics".to_string(),
                scheme: "http".to_string(),
            }],
            selector: LabelSelector {
                match_labels: labels,
            },
        },
    )
}

/// PodMonitor scraping the zync pods
pub fn zync_pod_monitor(opts: &ZyncOptions) -> PodMonitor {
    pod_monitor(ZYNC, opts.common_zync_labels())
}

/// PodMonitor scraping the zync-que pods
pub fn zync_que_pod_monitor(opts: &ZyncOptions) -> PodMonitor {
    pod_monitor(ZYNC_QUE, opts.common_zync_que_labels())
}

// =============================================================================
// GrafanaDashboard
// =============================================================================

#[derive(Serialize)]
struct DashboardContext<'a> {
    namespace: &'a str,
}

/// Grafana dashboard for zync in `namespace`
///
/// # Errors
///
/// Returns `Error::Template` if the bundled dashboard fails to render or
/// does not produce valid JSON.
pub fn zync_grafana_dashboard(namespace: &str) -> Result<GrafanaDashboard> {
    let engine = TemplateEngine::new();
    let model = engine.render_json(ZYNC_DASHBOARD_TEMPLATE, &DashboardContext { namespace })?;
    debug!(namespace, "rendered zync grafana dashboard");

    Ok(GrafanaDashboard::new(
        ObjectMeta::new(ZYNC).with_label("monitoring-key", MONITORING_KEY),
        GrafanaDashboardSpec {
            json: model.to_string(),
            name: format!("{namespace}/zync-grafana-dashboard-1.json"),
        },
    ))
}

// =============================================================================
// PrometheusRules
// =============================================================================

fn workers_running_low(
    name: &str,
    namespace: &str,
    alert: &str,
    metric: &str,
    job: &str,
    workers: &str,
) -> PrometheusRule {
    let summary = format!(
        "{{{{$labels.container_name}}}} replica controller on {{{{$labels.namespace}}}}: Has less than 5 {workers} workers in the last 5 minutes"
    );
    let description = format!(
        "{{{{$labels.container_name}}}} replica controller on {{{{$labels.namespace}}}} project: Has less than 5 {workers} workers in the last 5 minutes"
    );

    PrometheusRule::new(
        ObjectMeta::new(name)
            .with_label("prometheus", "application-monitoring")
            .with_label("role", "alert-rules"),
        PrometheusRuleSpec {
            groups: vec![RuleGroup {
                name: format!("{namespace}/{name}.rules"),
                rules: vec![Rule {
                    alert: alert.to_string(),
                    expr: format!(
                        r#"avg_over_time({metric}{{job="{job}",namespace="{namespace}"}} [5m]) < 5"#
                    ),
                    for_duration: "30m".to_string(),
                    labels: BTreeMap::from([("severity".to_string(), "critical".to_string())]),
                    annotations: BTreeMap::from([
                        ("summary".to_string(), summary),
                        ("description".to_string(), description),
                    ]),
                }],
            }],
        },
    )
}

/// Alert when zync runs fewer than five puma workers
pub fn zync_prometheus_rules(namespace: &str) -> PrometheusRule {
    workers_running_low(
        ZYNC,
        namespace,
        "PumaWorkersRunningLow",
        "puma_running",
        "zync-monitoring",
        "puma",
    )
}

/// Alert when zync-que runs fewer than five que workers
pub fn zync_que_prometheus_rules(namespace: &str) -> PrometheusRule {
    workers_running_low(
        ZYNC_QUE,
        namespace,
        "QueWorkersRunningLow",
        "que_workers_total",
        "zync-que-monitoring",
        "que",
    )
}

/// Every zync monitoring manifest, in apply order
pub fn zync_monitoring_manifests(
    opts: &ZyncOptions,
    namespace: &str,
) -> Result<Vec<MonitoringManifest>> {
    Ok(vec![
        zync_pod_monitor(opts).into(),
        zync_que_pod_monitor(opts).into(),
        zync_grafana_dashboard(namespace)?.into(),
        zync_prometheus_rules(namespace).into(),
        zync_que_prometheus_rules(namespace).into(),
    ])
}
