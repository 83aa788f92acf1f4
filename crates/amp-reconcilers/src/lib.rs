//! Field reconcilers and mutator pipelines for the API management operator
//!
//! A mutator takes the last-observed (`existing`) object and a freshly built
//! (`desired`) object, converges the fields it owns in place, and reports
//! whether anything changed. The caller persists `existing` only when the
//! mutator returns `Ok(true)`.
//!
//! Mutators are assembled from small [`FieldReconciler`]s, each owning one
//! field group of a `DeploymentConfig`:
//!
//! - [`ReplicasReconciler`] - `spec.replicas`
//! - [`ContainerResourcesReconciler`] - `containers[0].resources`
//! - [`AffinityReconciler`] - `spec.template.spec.affinity`
//! - [`TolerationsReconciler`] - `spec.template.spec.tolerations`

#![deny(missing_docs)]

pub mod accessor;
pub mod deployment_config;
pub mod mutator;
pub mod resources;

pub use accessor::downcast_pair;
pub use deployment_config::{
    AffinityReconciler, ContainerResourcesReconciler, FieldReconciler, ReplicasReconciler,
    TolerationsReconciler,
};
pub use mutator::{DeploymentConfigMutator, Mutator, MUTATOR_NAMES};
pub use resources::cmp_resources;
