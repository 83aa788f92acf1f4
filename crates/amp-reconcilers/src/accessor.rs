//! Checked downcast of opaque object handles
//!
//! Mutators are called with `&dyn KubernetesObject` handles. This is the one
//! place where the concrete type is recovered; every reconciler below it
//! works on typed objects.

use amp_common::kube_utils::short_type_name;
use amp_common::{Error, KubernetesObject, ObjectRole, Result};

/// Downcast an `(existing, desired)` pair to the concrete type `K`.
///
/// `existing` is checked first, then `desired`. Both checks complete before
/// the caller gets a mutable reference, so a mismatch on either handle
/// leaves `existing` untouched.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] naming the offending handle.
pub fn downcast_pair<'a, K: KubernetesObject>(
    existing: &'a mut dyn KubernetesObject,
    desired: &'a dyn KubernetesObject,
) -> Result<(&'a mut K, &'a K)> {
    let expected = short_type_name(std::any::type_name::<K>());

    if !existing.as_any().is::<K>() {
        return Err(Error::type_mismatch(
            ObjectRole::Existing,
            expected,
            existing.type_name(),
        ));
    }

    let desired = desired.as_any().downcast_ref::<K>().ok_or_else(|| {
        Error::type_mismatch(ObjectRole::Desired, expected, desired.type_name())
    })?;

    let found = existing.type_name();
    let existing = existing
        .as_any_mut()
        .downcast_mut::<K>()
        .ok_or_else(|| Error::type_mismatch(ObjectRole::Existing, expected, found))?;

    Ok((existing, desired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amp_common::crd::{DeploymentConfig, DeploymentConfigSpec};
    use k8s_openapi::api::core::v1::ConfigMap;

    fn dc(name: &str, replicas: i32) -> DeploymentConfig {
        DeploymentConfig::new(
            name,
            DeploymentConfigSpec {
                replicas,
                ..Default::default()
            },
        )
    }

    #[test]
    fn matching_types_downcast_to_typed_pair() {
        let mut existing = dc("zync", 1);
        let desired = dc("zync", 3);

        let (existing_dc, desired_dc) =
            downcast_pair::<DeploymentConfig>(&mut existing, &desired).unwrap();
        existing_dc.spec.replicas = desired_dc.spec.replicas;

        assert_eq!(existing.spec.replicas, 3);
    }

    #[test]
    fn wrong_existing_type_names_existing_handle() {
        let mut existing = ConfigMap::default();
        let desired = dc("zync", 1);

        let err = downcast_pair::<DeploymentConfig>(&mut existing, &desired).unwrap_err();
        match err {
            Error::TypeMismatch {
                role,
                expected,
                found,
            } => {
                assert_eq!(role, ObjectRole::Existing);
                assert_eq!(expected, "DeploymentConfig");
                assert_eq!(found, "ConfigMap");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn wrong_desired_type_names_desired_handle() {
        let mut existing = dc("zync", 1);
        let desired = ConfigMap::default();

        let err = downcast_pair::<DeploymentConfig>(&mut existing, &desired).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                role: ObjectRole::Desired,
                ..
            }
        ));
        assert!(err.is_retryable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn both_wrong_reports_existing_first() {
        let mut existing = ConfigMap::default();
        let desired = ConfigMap::default();

        let err = downcast_pair::<DeploymentConfig>(&mut existing, &desired).unwrap_err();
        assert!(err.to_string().starts_with("type mismatch for existing object"));
    }
}
