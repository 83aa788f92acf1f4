//! Field reconcilers for `DeploymentConfig`
//!
//! Each reconciler owns one field group. It compares `existing` against
//! `desired`, overwrites the group on `existing` when they differ, and
//! returns whether it changed anything. Differences worth an operator's
//! attention go to the injected [`DiffReporter`].

use amp_common::crd::DeploymentConfig;
use amp_common::diff::structural_diff;
use amp_common::{object_info, DiffReporter, Error, Result};
use tracing::debug;

use crate::resources::cmp_resources;

/// One convergence rule over a field group of a `DeploymentConfig`.
///
/// Reconcilers run in pipeline order against the same `existing` object, so
/// a later reconciler sees the mutations of earlier ones.
///
/// # Example
///
/// ```ignore
/// struct PausedReconciler;
///
/// impl FieldReconciler for PausedReconciler {
///     fn name(&self) -> &str { "paused" }
///
///     fn reconcile(
///         &self,
///         desired: &DeploymentConfig,
///         existing: &mut DeploymentConfig,
///         _reporter: &dyn DiffReporter,
///     ) -> Result<bool> {
///         if existing.spec.paused == desired.spec.paused {
///             return Ok(false);
///         }
///         existing.spec.paused = desired.spec.paused;
///         Ok(true)
///     }
/// }
/// ```
pub trait FieldReconciler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Converge the owned field group of `existing` toward `desired`.
    ///
    /// Returns `Ok(true)` when `existing` was modified.
    fn reconcile(
        &self,
        desired: &DeploymentConfig,
        existing: &mut DeploymentConfig,
        reporter: &dyn DiffReporter,
    ) -> Result<bool>;
}

// =============================================================================
// Replicas
// =============================================================================

/// Converges `spec.replicas`.
///
/// Replica drift is routine (manual scaling), so it is not reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplicasReconciler;

impl FieldReconciler for ReplicasReconciler {
    fn name(&self) -> &str {
        "replicas"
    }

    fn reconcile(
        &self,
        desired: &DeploymentConfig,
        existing: &mut DeploymentConfig,
        _reporter: &dyn DiffReporter,
    ) -> Result<bool> {
        if existing.spec.replicas == desired.spec.replicas {
            return Ok(false);
        }

        debug!(
            object = %object_info(desired),
            from = existing.spec.replicas,
            to = desired.spec.replicas,
            "replicas changed"
        );
        existing.spec.replicas = desired.spec.replicas;
        Ok(true)
    }
}

// =============================================================================
// Affinity
// =============================================================================

/// Converges `spec.template.spec.affinity` by wholesale replacement.
#[derive(Clone, Copy, Debug, Default)]
pub struct AffinityReconciler;

impl FieldReconciler for AffinityReconciler {
    fn name(&self) -> &str {
        "affinity"
    }

    fn reconcile(
        &self,
        desired: &DeploymentConfig,
        existing: &mut DeploymentConfig,
        reporter: &dyn DiffReporter,
    ) -> Result<bool> {
        let object = object_info(desired);
        if existing.affinity() == desired.affinity() {
            debug!(object = %object, "affinity in sync");
            return Ok(false);
        }

        let diff = structural_diff(&existing.affinity(), &desired.affinity());
        reporter.report(
            &object,
            &format!("{object} spec.template.spec.affinity has changed: {diff}"),
        );
        existing.pod_spec_mut().affinity = desired.affinity().cloned();
        Ok(true)
    }
}

// =============================================================================
// Tolerations
// =============================================================================

/// Converges `spec.template.spec.tolerations` by wholesale replacement.
///
/// Order matters: the same tolerations in a different order are a change.
#[derive(Clone, Copy, Debug, Default)]
pub struct TolerationsReconciler;

impl FieldReconciler for TolerationsReconciler {
    fn name(&self) -> &str {
        "tolerations"
    }

    fn reconcile(
        &self,
        desired: &DeploymentConfig,
        existing: &mut DeploymentConfig,
        reporter: &dyn DiffReporter,
    ) -> Result<bool> {
        let object = object_info(desired);
        if existing.tolerations() == desired.tolerations() {
            debug!(object = %object, "tolerations in sync");
            return Ok(false);
        }

        let diff = structural_diff(&existing.tolerations(), &desired.tolerations());
        reporter.report(
            &object,
            &format!("{object} spec.template.spec.tolerations has changed: {diff}"),
        );
        existing.pod_spec_mut().tolerations = desired.tolerations().cloned();
        Ok(true)
    }
}

// =============================================================================
// Container resources
// =============================================================================

/// Converges the resource requirements of the single container.
///
/// Managed DeploymentConfigs are built with exactly one container. A desired
/// object with any other count is a construction defect and fails with
/// [`Error::InvariantViolation`]. An existing object with another count has
/// drifted and gets the desired container list wholesale.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContainerResourcesReconciler;

impl FieldReconciler for ContainerResourcesReconciler {
    fn name(&self) -> &str {
        "container-resources"
    }

    fn reconcile(
        &self,
        desired: &DeploymentConfig,
        existing: &mut DeploymentConfig,
        reporter: &dyn DiffReporter,
    ) -> Result<bool> {
        let object = object_info(desired);
        let desired_containers = desired.containers();
        if desired_containers.len() != 1 {
            return Err(Error::invariant_violation(
                &object,
                format!(
                    "desired spec.template.spec.containers length changed to '{}', should be 1",
                    desired_containers.len()
                ),
            ));
        }

        let mut changed = false;

        let existing_len = existing.containers().len();
        if existing_len != 1 {
            reporter.report(
                &object,
                &format!(
                    "{object} spec.template.spec.containers length changed to '{existing_len}', recreating dc"
                ),
            );
            existing.pod_spec_mut().containers = desired_containers.to_vec();
            changed = true;
        }

        let desired_resources = desired_containers[0].resources.as_ref();
        let existing_container = &mut existing.pod_spec_mut().containers[0];
        if cmp_resources(existing_container.resources.as_ref(), desired_resources) {
            if !changed {
                debug!(object = %object, "container resources in sync");
            }
            return Ok(changed);
        }

        let diff = structural_diff(&existing_container.resources.as_ref(), &desired_resources);
        reporter.report(
            &object,
            &format!("{object} spec.template.spec.containers[0].resources have changed: {diff}"),
        );
        existing_container.resources = desired_resources.cloned();
        Ok(true)
    }
}
