use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, info, list, number, string};

#[cfg(test)]
#[path = "./ingresses.tests.rs"]
mod ingresses_tests;

const KIND: ResourceKind = ResourceKind::new("kube_ingress", &["namespace", "ingress"]);

/// Returns metric family generators for the `ingresses` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about ingress.", |_| info(&[], Vec::new())),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list).alpha(),
        KIND.created().alpha(),
        KIND.resource_version("Resource version representing a specific version of ingress."),
        KIND.gauge("path", "Ingress host, paths and backend service information.", |i| {
            let mut metrics = Vec::new();
            for rule in list(&i.data["spec"]["rules"]) {
                for path in list(&rule["http"]["paths"]) {
                    let service = &path["backend"]["service"];
                    metrics.push(Metric::with_labels(
                        &["host", "path", "service_name", "service_port"],
                        vec![
                            string(&rule["host"]).to_owned(),
                            string(&path["path"]).to_owned(),
                            string(&service["name"]).to_owned(),
                            number(&service["port"]["number"]).to_string(),
                        ],
                        1.0,
                    ));
                }
            }

            Family::from_metrics(metrics)
        }),
        KIND.gauge("tls", "Ingress TLS host and secret information.", |i| {
            let metrics = list(&i.data["spec"]["tls"])
                .iter()
                .flat_map(|tls| {
                    list(&tls["hosts"]).iter().map(move |host| {
                        Metric::with_labels(
                            &["tls_host", "secret"],
                            vec![string(host).to_owned(), string(&tls["secretName"]).to_owned()],
                            1.0,
                        )
                    })
                })
                .collect();
            Family::from_metrics(metrics)
        }),
    ]
}
