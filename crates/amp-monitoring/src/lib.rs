//! Monitoring manifests for the zync component
//!
//! Pure builders: every function returns a typed manifest ready to be
//! serialized and applied. Nothing here talks to a cluster.
//!
//! - `PodMonitor` (`monitoring.coreos.com/v1`) scraping zync and zync-que
//! - `PrometheusRule` (`monitoring.coreos.com/v1`) alerting on low worker counts
//! - `GrafanaDashboard` (`integreatly.org/v1alpha1`) rendered from a bundled template

#![deny(missing_docs)]

pub mod types;
pub mod zync;

pub use types::{GrafanaDashboard, MonitoringManifest, PodMonitor, PrometheusRule};
pub use zync::{
    zync_grafana_dashboard, zync_monitoring_manifests, zync_pod_monitor, zync_prometheus_rules,
    zync_que_pod_monitor, zync_que_prometheus_rules, ZyncOptions,
};
