//! Custom Resource Definitions managed by the operator
//!
//! `DeploymentConfig` is an OpenShift built-in rather than one of our own
//! CRDs, but k8s-openapi does not ship it, so it is modeled here with the
//! same derive machinery.

mod deployment_config;

pub use deployment_config::{DeploymentConfig, DeploymentConfigSpec, DeploymentConfigStatus};
