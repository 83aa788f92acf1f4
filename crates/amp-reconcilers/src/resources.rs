//! Semantic comparison of container resource requirements

use std::collections::BTreeMap;

use amp_common::quantity::quantities_equal;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Compare two resource requirement blocks by the amounts they denote.
///
/// `limits` and `requests` must hold the same keys with semantically equal
/// quantities (`1000m` equals `1`, `1Ki` equals `1024`). An absent block, an
/// absent map and an empty map all mean "no entries". `claims` are not
/// compared.
pub fn cmp_resources(a: Option<&ResourceRequirements>, b: Option<&ResourceRequirements>) -> bool {
    quantity_maps_equal(limits(a), limits(b)) && quantity_maps_equal(requests(a), requests(b))
}

fn limits(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
    r.and_then(|r| r.limits.as_ref())
}

fn requests(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
    r.and_then(|r| r.requests.as_ref())
}

fn quantity_maps_equal(
    a: Option<&BTreeMap<String, Quantity>>,
    b: Option<&BTreeMap<String, Quantity>>,
) -> bool {
    let empty = BTreeMap::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);

    a.len() == b.len()
        && a.iter()
            .all(|(name, qa)| b.get(name).is_some_and(|qb| quantities_equal(qa, qb)))
}
