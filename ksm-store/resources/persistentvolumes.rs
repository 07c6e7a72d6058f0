use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, info, optional_gauge, quantity, state_set, string};

const KIND: ResourceKind = ResourceKind::new("kube_persistentvolume", &["persistentvolume"]);

/// Returns metric family generators for the `persistentvolumes` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("claim_ref", "Information about the Persistent Volume Claim Reference.", |p| {
            let claim = &p.data["spec"]["claimRef"];
            if claim.is_null() {
                return Family::empty();
            }

            info(
                &["name", "claim_namespace"],
                vec![string(&claim["name"]).to_owned(), string(&claim["namespace"]).to_owned()],
            )
        })
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge(
            "status_phase",
            "The phase indicates if a volume is available, bound to a claim, or released by a claim.",
            |p| match p.data["status"]["phase"].as_str() {
                Some(phase) if !phase.is_empty() => {
                    state_set("phase", &["Pending", "Available", "Bound", "Released", "Failed"], phase)
                },
                _ => Family::empty(),
            },
        )
        .stable(),
        KIND.gauge("info", "Information about persistentvolume.", volume_info).stable(),
        KIND.gauge("capacity_bytes", "Persistentvolume capacity in bytes.", |p| {
            optional_gauge(quantity(&p.data["spec"]["capacity"]["storage"]))
        })
        .stable(),
        KIND.created(),
        KIND.deletion_timestamp(),
    ]
}

fn volume_info(volume: &DynamicObject) -> Family {
    let spec = &volume.data["spec"];
    let fc = &spec["fc"];
    let iscsi = &spec["iscsi"];
    let join = |value: &Value| {
        value
            .as_array()
            .map(|items| items.iter().map(string).collect::<Vec<_>>().join(","))
            .unwrap_or_default()
    };

    info(
        &[
            "storageclass",
            "gce_persistent_disk_name",
            "ebs_volume_id",
            "azure_disk_name",
            "fc_wwids",
            "fc_lun",
            "fc_target_wwns",
            "iscsi_target_portal",
            "iscsi_iqn",
            "iscsi_lun",
            "iscsi_initiator_name",
            "nfs_server",
            "nfs_path",
        ],
        vec![
            string(&spec["storageClassName"]).to_owned(),
            string(&spec["gcePersistentDisk"]["pdName"]).to_owned(),
            string(&spec["awsElasticBlockStore"]["volumeID"]).to_owned(),
            string(&spec["azureDisk"]["diskName"]).to_owned(),
            join(&fc["wwids"]),
            fc["lun"].as_i64().map(|l| l.to_string()).unwrap_or_default(),
            join(&fc["targetWWNs"]),
            string(&iscsi["targetPortal"]).to_owned(),
            string(&iscsi["iqn"]).to_owned(),
            iscsi["lun"].as_i64().map(|l| l.to_string()).unwrap_or_default(),
            string(&iscsi["initiatorName"]).to_owned(),
            string(&spec["nfs"]["server"]).to_owned(),
            string(&spec["nfs"]["path"]).to_owned(),
        ],
    )
}
