use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, list, optional_gauge};
use crate::values::timestamp_seconds;

#[cfg(test)]
#[path = "./networkpolicies.tests.rs"]
mod networkpolicies_tests;

const KIND: ResourceKind = ResourceKind::new("kube_networkpolicy", &["namespace", "networkpolicy"]);

/// Returns metric family generators for the `networkpolicies` resource.\
/// **Note** that all network policy families are alpha.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("created", "Unix creation timestamp of network policy", |n| {
            optional_gauge(n.metadata.creation_timestamp.as_ref().map(|t| timestamp_seconds(&t.0)))
        }),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list).alpha(),
        KIND.gauge("spec_ingress_rules", "Number of ingress rules on the networkpolicy", |n| {
            Family::single(list(&n.data["spec"]["ingress"]).len() as f64)
        }),
        KIND.gauge("spec_egress_rules", "Number of egress rules on the networkpolicy", |n| {
            Family::single(list(&n.data["spec"]["egress"]).len() as f64)
        }),
    ]
}
