//! Mutator pipelines
//!
//! A [`DeploymentConfigMutator`] downcasts its two handles once, then runs an
//! ordered list of [`FieldReconciler`]s against the typed pair. Every
//! reconciler runs even after an earlier one reported a change; only an
//! error stops the pipeline.

use std::fmt;
use std::sync::Arc;

use amp_common::crd::DeploymentConfig;
use amp_common::{object_info, DiffReporter, KubernetesObject, Result};
use tracing::{debug, warn};

use crate::accessor::downcast_pair;
use crate::deployment_config::{
    AffinityReconciler, ContainerResourcesReconciler, FieldReconciler, ReplicasReconciler,
    TolerationsReconciler,
};

/// Names accepted by [`DeploymentConfigMutator::by_name`]
pub const MUTATOR_NAMES: &[&str] = &["generic", "resources", "resources-affinity-tolerations"];

/// Converges an existing object toward a desired one.
///
/// Returns `Ok(true)` when `existing` was modified and should be persisted.
/// On error, the caller must not persist `existing`.
pub trait Mutator: Send + Sync {
    /// Mutate `existing` in place toward `desired`
    fn mutate(
        &self,
        existing: &mut dyn KubernetesObject,
        desired: &dyn KubernetesObject,
    ) -> Result<bool>;
}

/// Ordered reconciler pipeline over `DeploymentConfig`s
pub struct DeploymentConfigMutator {
    name: &'static str,
    reconcilers: Vec<Box<dyn FieldReconciler>>,
    reporter: Arc<dyn DiffReporter>,
}

impl fmt::Debug for DeploymentConfigMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfigMutator")
            .field("name", &self.name)
            .field("reconcilers", &self.reconciler_names())
            .finish_non_exhaustive()
    }
}

impl DeploymentConfigMutator {
    /// Build a pipeline from an explicit reconciler list
    pub fn new(
        name: &'static str,
        reconcilers: Vec<Box<dyn FieldReconciler>>,
        reporter: Arc<dyn DiffReporter>,
    ) -> Self {
        Self {
            name,
            reconcilers,
            reporter,
        }
    }

    /// Container resources only
    pub fn resources(reporter: Arc<dyn DiffReporter>) -> Self {
        Self::new(
            "resources",
            vec![Box::new(ContainerResourcesReconciler)],
            reporter,
        )
    }

    /// Container resources, then affinity, then tolerations
    pub fn resources_affinity_tolerations(reporter: Arc<dyn DiffReporter>) -> Self {
        Self::new(
            "resources-affinity-tolerations",
            vec![
                Box::new(ContainerResourcesReconciler),
                Box::new(AffinityReconciler),
                Box::new(TolerationsReconciler),
            ],
            reporter,
        )
    }

    /// Replicas, then container resources, affinity and tolerations
    pub fn generic(reporter: Arc<dyn DiffReporter>) -> Self {
        Self::new(
            "generic",
            vec![
                Box::new(ReplicasReconciler),
                Box::new(ContainerResourcesReconciler),
                Box::new(AffinityReconciler),
                Box::new(TolerationsReconciler),
            ],
            reporter,
        )
    }

    /// Look up one of the built-in pipelines by name (see [`MUTATOR_NAMES`])
    pub fn by_name(name: &str, reporter: Arc<dyn DiffReporter>) -> Option<Self> {
        match name {
            "generic" => Some(Self::generic(reporter)),
            "resources" => Some(Self::resources(reporter)),
            "resources-affinity-tolerations" => Some(Self::resources_affinity_tolerations(reporter)),
            _ => None,
        }
    }

    /// Pipeline name
    pub fn name(&self) -> &str {
        self.name
    }

    /// Reconciler names in execution order
    pub fn reconciler_names(&self) -> Vec<&str> {
        self.reconcilers.iter().map(|r| r.name()).collect()
    }

    /// Run the pipeline on an already typed pair
    pub fn reconcile(
        &self,
        existing: &mut DeploymentConfig,
        desired: &DeploymentConfig,
    ) -> Result<bool> {
        let mut changed = false;
        for reconciler in &self.reconcilers {
            // `|=` so every reconciler runs regardless of earlier results
            changed |= reconciler
                .reconcile(desired, existing, self.reporter.as_ref())
                .inspect_err(|e| {
                    warn!(
                        object = %object_info(desired),
                        reconciler = reconciler.name(),
                        error = %e,
                        "reconciler failed"
                    )
                })?;
        }

        debug!(
            object = %object_info(desired),
            mutator = self.name,
            changed,
            "mutator finished"
        );
        Ok(changed)
    }
}

impl Mutator for DeploymentConfigMutator {
    fn mutate(
        &self,
        existing: &mut dyn KubernetesObject,
        desired: &dyn KubernetesObject,
    ) -> Result<bool> {
        let (existing, desired) = downcast_pair::<DeploymentConfig>(existing, desired)?;
        self.reconcile(existing, desired)
    }
}
