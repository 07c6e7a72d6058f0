use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, info, list, string};

#[cfg(test)]
#[path = "./services.tests.rs"]
mod services_tests;

const KIND: ResourceKind = ResourceKind::new("kube_service", &["namespace", "service"]);

/// Returns metric family generators for the `services` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about service.", |s| {
            let spec = &s.data["spec"];
            info(
                &["cluster_ip", "external_name", "load_balancer_ip"],
                vec![
                    string(&spec["clusterIP"]).to_owned(),
                    string(&spec["externalName"]).to_owned(),
                    string(&spec["loadBalancerIP"]).to_owned(),
                ],
            )
        })
        .stable(),
        KIND.created(),
        KIND.gauge("spec_type", "Type about service.", |s| {
            info(&["type"], vec![string(&s.data["spec"]["type"]).to_owned()])
        })
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("spec_external_ip", "Service external ips. One series for each ip", |s| {
            let metrics = list(&s.data["spec"]["externalIPs"])
                .iter()
                .map(|ip| Metric::with_labels(&["external_ip"], vec![string(ip).to_owned()], 1.0))
                .collect();
            Family::from_metrics(metrics)
        })
        .stable(),
        KIND.gauge("status_load_balancer_ingress", "Service load balancer ingress status", |s| {
            let metrics = list(&s.data["status"]["loadBalancer"]["ingress"])
                .iter()
                .map(|ingress| {
                    Metric::with_labels(
                        &["ip", "hostname"],
                        vec![string(&ingress["ip"]).to_owned(), string(&ingress["hostname"]).to_owned()],
                        1.0,
                    )
                })
                .collect();
            Family::from_metrics(metrics)
        })
        .stable(),
    ]
}
