use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::labels::bool_value;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, info, list, number, optional_gauge, string, timestamp, typed_conditions};

#[cfg(test)]
#[path = "./jobs.tests.rs"]
mod jobs_tests;

const KIND: ResourceKind = ResourceKind::new("kube_job", &["namespace", "job_name"]);
const FAILURE_REASONS: [&str; 3] = ["BackoffLimitExceeded", "DeadlineExceeded", "Evicted"];

/// Returns metric family generators for the `jobs` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("info", "Information about job.", |_| info(&[], Vec::new())).stable(),
        KIND.created(),
        KIND.gauge(
            "spec_parallelism",
            "The maximum desired number of pods the job should run at any given time.",
            |j| optional_gauge(j.data["spec"]["parallelism"].as_f64()),
        )
        .stable(),
        KIND.gauge(
            "spec_completions",
            "The desired number of successfully finished pods the job should be run with.",
            |j| optional_gauge(j.data["spec"]["completions"].as_f64()),
        )
        .stable(),
        KIND.gauge(
            "spec_active_deadline_seconds",
            "The duration in seconds relative to the startTime that the job may be active before the system tries to terminate it.",
            |j| optional_gauge(j.data["spec"]["activeDeadlineSeconds"].as_f64()),
        )
        .stable(),
        KIND.gauge("status_succeeded", "The number of pods which reached Phase Succeeded.", |j| {
            Family::single(number(&j.data["status"]["succeeded"]))
        })
        .stable(),
        KIND.gauge(
            "status_failed",
            "The number of pods which reached Phase Failed and the reason for failure.",
            |j| status_failed(&j.data["status"]),
        )
        .stable(),
        KIND.gauge("status_active", "The number of actively running pods.", |j| {
            Family::single(number(&j.data["status"]["active"]))
        })
        .stable(),
        KIND.gauge("status_ready", "The number of ready pods that belong to this Job.", |j| {
            Family::single(number(&j.data["status"]["ready"]))
        }),
        KIND.gauge("complete", "The job has completed its execution.", |j| {
            typed_conditions(&j.data["status"]["conditions"], "Complete")
        })
        .stable(),
        KIND.gauge("failed", "The job has failed its execution.", |j| {
            typed_conditions(&j.data["status"]["conditions"], "Failed")
        })
        .stable(),
        KIND.gauge(
            "status_start_time",
            "StartTime represents time when the job was acknowledged by the Job Manager.",
            |j| optional_gauge(timestamp(&j.data["status"]["startTime"])),
        )
        .stable(),
        KIND.gauge(
            "status_completion_time",
            "CompletionTime represents time when the job was completed.",
            |j| optional_gauge(timestamp(&j.data["status"]["completionTime"])),
        )
        .stable(),
        KIND.gauge("status_suspended", "The number of pods which reached Phase Suspended.", |j| {
            let metrics = list(&j.data["status"]["conditions"])
                .iter()
                .filter(|c| c["type"] == "Suspended")
                .map(|c| Metric::new(bool_value(c["status"] == "True")))
                .collect();
            Family::from_metrics(metrics)
        }),
        KIND.owner("Information about the Job's owner.").stable(),
    ]
}

/// Failed pods count, split by the known failure reasons of the `Failed` condition.
fn status_failed(status: &Value) -> Family {
    let failed = number(&status["failed"]);
    if failed == 0.0 {
        return Family::single(failed);
    }

    let mut metrics = Vec::new();
    let mut is_reason_known = false;
    for condition in list(&status["conditions"]).iter().filter(|c| c["type"] == "Failed") {
        let reason = string(&condition["reason"]);
        for known in FAILURE_REASONS {
            is_reason_known |= reason == known;
            metrics.push(Metric::with_labels(&["reason"], vec![known.to_owned()], bool_value(reason == known)));
        }
    }

    if !is_reason_known {
        metrics.push(Metric::with_labels(&["reason"], vec![String::new()], failed));
    }

    Family::from_metrics(metrics)
}
