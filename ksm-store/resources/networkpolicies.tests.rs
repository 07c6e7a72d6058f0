use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

#[test]
fn rules_test() {
    let generators = generators(&[], &[]);
    let policy = object(json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "NetworkPolicy",
        "metadata": { "name": "deny-all", "namespace": "prod", "creationTimestamp": "2024-01-01T00:00:00Z" },
        "spec": {
            "podSelector": {},
            "ingress": [{ "from": [] }, { "ports": [{ "port": 80 }] }]
        }
    }));

    assert_eq!(
        "kube_networkpolicy_spec_ingress_rules{namespace=\"prod\",networkpolicy=\"deny-all\"} 2\n",
        render(&generators, "kube_networkpolicy_spec_ingress_rules", &policy)
    );
    assert_eq!(
        "kube_networkpolicy_spec_egress_rules{namespace=\"prod\",networkpolicy=\"deny-all\"} 0\n",
        render(&generators, "kube_networkpolicy_spec_egress_rules", &policy)
    );
    assert_eq!(
        "kube_networkpolicy_created{namespace=\"prod\",networkpolicy=\"deny-all\"} 1704067200\n",
        render(&generators, "kube_networkpolicy_created", &policy)
    );
}
