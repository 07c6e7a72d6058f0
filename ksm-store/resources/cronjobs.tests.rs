use k8s_openapi::serde_json::{Value, json};

use super::*;
use crate::resources::testing::{object, render};

fn cronjob(status: Value) -> DynamicObject {
    object(json!({
        "apiVersion": "batch/v1",
        "kind": "CronJob",
        "metadata": {
            "name": "backup",
            "namespace": "ops",
            "creationTimestamp": "2024-01-01T00:00:00Z"
        },
        "spec": {
            "schedule": "*/5 * * * *",
            "concurrencyPolicy": "Forbid",
            "suspend": false
        },
        "status": status
    }))
}

#[test]
fn next_schedule_time_after_last_schedule_test() {
    let generators = generators(&[], &[]);
    let cronjob = cronjob(json!({ "lastScheduleTime": "2024-03-10T10:00:00Z" }));

    assert_eq!(
        "kube_cronjob_next_schedule_time{namespace=\"ops\",cronjob=\"backup\"} 1710065100\n",
        render(&generators, "kube_cronjob_next_schedule_time", &cronjob)
    );
    assert_eq!(
        "kube_cronjob_status_last_schedule_time{namespace=\"ops\",cronjob=\"backup\"} 1710064800\n",
        render(&generators, "kube_cronjob_status_last_schedule_time", &cronjob)
    );
}

#[test]
fn next_schedule_time_after_creation_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_cronjob_next_schedule_time{namespace=\"ops\",cronjob=\"backup\"} 1704067500\n",
        render(&generators, "kube_cronjob_next_schedule_time", &cronjob(json!({})))
    );
}

#[test]
fn info_test() {
    let generators = generators(&[], &[]);
    let cronjob = cronjob(json!({ "active": [{ "name": "backup-1" }, { "name": "backup-2" }] }));

    assert_eq!(
        "kube_cronjob_info{namespace=\"ops\",cronjob=\"backup\",schedule=\"*/5 * * * *\",concurrency_policy=\"Forbid\",timezone=\"local\"} 1\n",
        render(&generators, "kube_cronjob_info", &cronjob)
    );
    assert_eq!(
        "kube_cronjob_status_active{namespace=\"ops\",cronjob=\"backup\"} 2\n",
        render(&generators, "kube_cronjob_status_active", &cronjob)
    );
    assert_eq!(
        "kube_cronjob_spec_suspend{namespace=\"ops\",cronjob=\"backup\"} 0\n",
        render(&generators, "kube_cronjob_spec_suspend", &cronjob)
    );
    assert_eq!("", render(&generators, "kube_cronjob_spec_starting_deadline_seconds", &cronjob));
}
