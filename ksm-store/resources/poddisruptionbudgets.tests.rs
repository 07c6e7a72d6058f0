use k8s_openapi::serde_json::json;
use rstest::rstest;

use super::*;
use crate::resources::testing::{object, render};

#[rstest]
#[case("kube_poddisruptionbudget_status_current_healthy", "3")]
#[case("kube_poddisruptionbudget_status_desired_healthy", "2")]
#[case("kube_poddisruptionbudget_status_pod_disruptions_allowed", "1")]
#[case("kube_poddisruptionbudget_status_expected_pods", "3")]
#[case("kube_poddisruptionbudget_status_observed_generation", "0")]
fn status_test(#[case] family: &str, #[case] expected: &str) {
    let generators = generators(&[], &[]);
    let budget = object(json!({
        "apiVersion": "policy/v1",
        "kind": "PodDisruptionBudget",
        "metadata": { "name": "web", "namespace": "shop" },
        "status": { "currentHealthy": 3, "desiredHealthy": 2, "disruptionsAllowed": 1, "expectedPods": 3 }
    }));

    assert_eq!(
        format!("{family}{{namespace=\"shop\",poddisruptionbudget=\"web\"}} {expected}\n"),
        render(&generators, family, &budget)
    );
}

#[test]
fn stability_test() {
    let generators = generators(&[], &[]);
    let help = |name: &str| {
        generators
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.header().help)
            .expect("family generator")
    };

    assert_eq!("Kubernetes labels converted to Prometheus labels.", help("kube_poddisruptionbudget_labels"));
    assert_eq!("[STABLE] Unix creation timestamp", help("kube_poddisruptionbudget_created"));
}
