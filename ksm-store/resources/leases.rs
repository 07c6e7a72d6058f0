use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, optional_gauge, string, timestamp};

const KIND: ResourceKind = ResourceKind::new("kube_lease", &["lease"]);

/// Returns metric family generators for the `leases` resource.\
/// **Note** that leases do not expose labels and annotations.
pub fn generators(_: &[String], _: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("owner", "Information about the Lease's owner.", |l| {
            let keys = ["owner_kind", "owner_name", "namespace", "lease_holder"];
            let namespace = l.metadata.namespace.clone().unwrap_or_default();
            let holder = string(&l.data["spec"]["holderIdentity"]).to_owned();
            let owners = l.metadata.owner_references.as_deref().unwrap_or_default();
            if owners.is_empty() {
                return Family::from_metrics(vec![Metric::with_labels(
                    &keys,
                    vec![String::new(), String::new(), namespace, holder],
                    1.0,
                )]);
            }

            let metrics = owners
                .iter()
                .map(|o| Metric::with_labels(&keys, vec![o.kind.clone(), o.name.clone(), namespace.clone(), holder.clone()], 1.0))
                .collect();
            Family::from_metrics(metrics)
        }),
        KIND.gauge("renew_time", "Kube lease renew time.", |l| {
            optional_gauge(timestamp(&l.data["spec"]["renewTime"]))
        }),
    ]
}
