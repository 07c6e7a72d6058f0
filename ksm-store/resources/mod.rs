use k8s_openapi::api::{apps, autoscaling, batch, coordination, core, networking, policy, storage};
use kube::api::{ApiResource, DynamicObject};
use ksm_metrics::FamilyGenerator;

mod configmaps;
mod cronjobs;
mod daemonsets;
mod deployments;
mod endpoints;
mod horizontalpodautoscalers;
mod ingresses;
mod jobs;
mod leases;
mod limitranges;
mod namespaces;
mod networkpolicies;
mod nodes;
mod persistentvolumeclaims;
mod persistentvolumes;
mod poddisruptionbudgets;
mod pods;
mod replicasets;
mod replicationcontrollers;
mod resourcequotas;
mod schedule;
mod secrets;
mod services;
mod statefulsets;
mod storageclasses;
mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// Function that returns family generators for the given labels and annotations allow lists.
pub type GeneratorsFn = fn(&[String], &[String]) -> Vec<FamilyGenerator<DynamicObject>>;

/// Names of all built-in resources that can be collected.
pub const AVAILABLE_RESOURCES: [&str; 24] = [
    "configmaps",
    "cronjobs",
    "daemonsets",
    "deployments",
    "endpoints",
    "horizontalpodautoscalers",
    "ingresses",
    "jobs",
    "leases",
    "limitranges",
    "namespaces",
    "networkpolicies",
    "nodes",
    "persistentvolumeclaims",
    "persistentvolumes",
    "poddisruptionbudgets",
    "pods",
    "replicasets",
    "replicationcontrollers",
    "resourcequotas",
    "secrets",
    "services",
    "statefulsets",
    "storageclasses",
];

/// Built-in collector for one kubernetes resource.
#[derive(Debug, Clone)]
pub struct Collector {
    pub name: &'static str,
    pub api_resource: ApiResource,
    pub namespaced: bool,
    pub generators: GeneratorsFn,
}

impl Collector {
    fn new<K>(name: &'static str, namespaced: bool, generators: GeneratorsFn) -> Self
    where
        K: kube::Resource<DynamicType = ()>,
    {
        Self {
            name,
            api_resource: ApiResource::erase::<K>(&()),
            namespaced,
            generators,
        }
    }
}

/// Returns built-in collector for the resource `name`, e.g. `pods`.
pub fn collector(name: &str) -> Option<Collector> {
    let collector = match name {
        "configmaps" => Collector::new::<core::v1::ConfigMap>("configmaps", true, configmaps::generators),
        "cronjobs" => Collector::new::<batch::v1::CronJob>("cronjobs", true, cronjobs::generators),
        "daemonsets" => Collector::new::<apps::v1::DaemonSet>("daemonsets", true, daemonsets::generators),
        "deployments" => Collector::new::<apps::v1::Deployment>("deployments", true, deployments::generators),
        "endpoints" => Collector::new::<core::v1::Endpoints>("endpoints", true, endpoints::generators),
        "horizontalpodautoscalers" => Collector::new::<autoscaling::v2::HorizontalPodAutoscaler>(
            "horizontalpodautoscalers",
            true,
            horizontalpodautoscalers::generators,
        ),
        "ingresses" => Collector::new::<networking::v1::Ingress>("ingresses", true, ingresses::generators),
        "jobs" => Collector::new::<batch::v1::Job>("jobs", true, jobs::generators),
        "leases" => Collector::new::<coordination::v1::Lease>("leases", true, leases::generators),
        "limitranges" => Collector::new::<core::v1::LimitRange>("limitranges", true, limitranges::generators),
        "namespaces" => Collector::new::<core::v1::Namespace>("namespaces", false, namespaces::generators),
        "networkpolicies" => {
            Collector::new::<networking::v1::NetworkPolicy>("networkpolicies", true, networkpolicies::generators)
        },
        "nodes" => Collector::new::<core::v1::Node>("nodes", false, nodes::generators),
        "persistentvolumeclaims" => Collector::new::<core::v1::PersistentVolumeClaim>(
            "persistentvolumeclaims",
            true,
            persistentvolumeclaims::generators,
        ),
        "persistentvolumes" => {
            Collector::new::<core::v1::PersistentVolume>("persistentvolumes", false, persistentvolumes::generators)
        },
        "poddisruptionbudgets" => Collector::new::<policy::v1::PodDisruptionBudget>(
            "poddisruptionbudgets",
            true,
            poddisruptionbudgets::generators,
        ),
        "pods" => Collector::new::<core::v1::Pod>("pods", true, pods::generators),
        "replicasets" => Collector::new::<apps::v1::ReplicaSet>("replicasets", true, replicasets::generators),
        "replicationcontrollers" => Collector::new::<core::v1::ReplicationController>(
            "replicationcontrollers",
            true,
            replicationcontrollers::generators,
        ),
        "resourcequotas" => {
            Collector::new::<core::v1::ResourceQuota>("resourcequotas", true, resourcequotas::generators)
        },
        "secrets" => Collector::new::<core::v1::Secret>("secrets", true, secrets::generators),
        "services" => Collector::new::<core::v1::Service>("services", true, services::generators),
        "statefulsets" => Collector::new::<apps::v1::StatefulSet>("statefulsets", true, statefulsets::generators),
        "storageclasses" => {
            Collector::new::<storage::v1::StorageClass>("storageclasses", false, storageclasses::generators)
        },
        _ => return None,
    };

    Some(collector)
}
