//! Shared Kubernetes object utilities
//!
//! Mutators receive objects as `&dyn KubernetesObject` so a single mutator
//! signature can serve every managed kind. The concrete type is recovered
//! with a checked downcast at one boundary (see `amp_reconcilers::accessor`).

use std::any::Any;
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta as K8sObjectMeta;
use kube::Resource;

// =============================================================================
// KubernetesObject - type-erased handle to a typed Kubernetes resource
// =============================================================================

/// A Kubernetes object whose concrete type is only known at runtime.
///
/// Blanket-implemented for every statically typed `kube::Resource`
/// (k8s-openapi types and `#[derive(CustomResource)]` types alike).
pub trait KubernetesObject: Any + Send + Sync {
    /// Kubernetes kind (e.g., "DeploymentConfig")
    fn object_kind(&self) -> String;

    /// Object metadata
    fn object_meta(&self) -> &K8sObjectMeta;

    /// Unqualified Rust type name, used in type mismatch errors
    fn type_name(&self) -> &'static str;

    /// Upcast for shared downcasting
    fn as_any(&self) -> &dyn Any;

    /// Upcast for exclusive downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K> KubernetesObject for K
where
    K: Resource<DynamicType = ()> + Any + Send + Sync,
{
    fn object_kind(&self) -> String {
        K::kind(&()).into_owned()
    }

    fn object_meta(&self) -> &K8sObjectMeta {
        self.meta()
    }

    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<K>())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Strip the module path from a fully qualified type name.
///
/// `amp_common::crd::DeploymentConfig` becomes `DeploymentConfig`.
/// Generic arguments are kept as-is.
pub fn short_type_name(full: &str) -> &str {
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Human-readable identifier for an object: `Kind/name`.
///
/// Falls back to `generateName` and then to an empty name so that objects
/// still being built can be identified in diff reports.
pub fn object_info(obj: &dyn KubernetesObject) -> String {
    let meta = obj.object_meta();
    let name = meta
        .name
        .as_deref()
        .or(meta.generate_name.as_deref())
        .unwrap_or_default();
    format!("{}/{}", obj.object_kind(), name)
}

// =============================================================================
// ObjectMeta - metadata for compiled (non-CRD) manifests
// =============================================================================

/// Kubernetes metadata for manifests this operator builds itself.
///
/// Monitoring manifests are created in whatever namespace the caller applies
/// them to, so the namespace is optional.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create new metadata with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Replace all labels
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }
}

// =============================================================================
// HasApiResource Trait
// =============================================================================

/// Trait for manifest types that have a known API version and kind.
///
/// Implement this for hand-written manifest types so serialization always
/// emits a consistent `apiVersion`/`kind` pair.
///
/// # Example
/// ```ignore
/// impl HasApiResource for PodMonitor {
///     const API_VERSION: &'static str = "monitoring.coreos.com/v1";
///     const KIND: &'static str = "PodMonitor";
/// }
/// ```
pub trait HasApiResource {
    /// Full API version (e.g., "monitoring.coreos.com/v1", "v1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g., "PodMonitor")
    const KIND: &'static str;
}
