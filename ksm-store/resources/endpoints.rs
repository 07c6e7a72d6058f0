use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, info, list, number, string};

#[cfg(test)]
#[path = "./endpoints.tests.rs"]
mod endpoints_tests;

const KIND: ResourceKind = ResourceKind::new("kube_endpoint", &["namespace", "endpoint"]);

/// Returns metric family generators for the `endpoints` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about endpoint.", |_| info(&[], Vec::new())).stable(),
        KIND.created(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge(
            "address",
            "Information about Endpoint available and non available addresses.",
            |e| {
                let mut metrics = Vec::new();
                for subset in list(&e.data["subsets"]) {
                    for port in list(&subset["ports"]) {
                        let addresses = [("addresses", "true"), ("notReadyAddresses", "false")];
                        for (field, ready) in addresses {
                            for address in list(&subset[field]) {
                                metrics.push(Metric::with_labels(
                                    &["port_protocol", "port_number", "port_name", "ip", "ready"],
                                    vec![
                                        string(&port["protocol"]).to_owned(),
                                        number(&port["port"]).to_string(),
                                        string(&port["name"]).to_owned(),
                                        string(&address["ip"]).to_owned(),
                                        ready.to_owned(),
                                    ],
                                    1.0,
                                ));
                            }
                        }
                    }
                }

                Family::from_metrics(metrics)
            },
        )
        .stable(),
        KIND.gauge("ports", "Information about the Endpoint ports.", |e| {
            let metrics = list(&e.data["subsets"])
                .iter()
                .flat_map(|subset| list(&subset["ports"]))
                .map(|port| {
                    Metric::with_labels(
                        &["port_name", "port_protocol", "port_number"],
                        vec![
                            string(&port["name"]).to_owned(),
                            string(&port["protocol"]).to_owned(),
                            number(&port["port"]).to_string(),
                        ],
                        1.0,
                    )
                })
                .collect();
            Family::from_metrics(metrics)
        })
        .stable()
        .deprecated("v2.14.0"),
    ]
}
