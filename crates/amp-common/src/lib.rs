//! Common types for the API management operator: CRDs, errors, quantities,
//! diff reporting and utilities

#![deny(missing_docs)]

pub mod crd;
pub mod diff;
pub mod error;
pub mod kube_utils;
pub mod quantity;
pub mod telemetry;
pub mod template;

pub use diff::{DiffReporter, NoopDiffReporter, RecordingDiffReporter, TracingDiffReporter};
pub use error::{Error, ObjectRole};
pub use kube_utils::{object_info, KubernetesObject};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label key naming the application that owns a resource
pub const LABEL_APP: &str = "app";

/// Label key naming the platform component a resource belongs to
pub const LABEL_COMPONENT: &str = "threescale_component";

/// Label key naming the element within a component
pub const LABEL_COMPONENT_ELEMENT: &str = "threescale_component_element";

/// Label value used by the Grafana operator to discover dashboards
pub const MONITORING_KEY: &str = "middleware";
