use k8s_openapi::chrono::{DateTime, Utc};
use kube::api::DynamicObject;
use ksm_metrics::labels::bool_value;
use ksm_metrics::{Family, FamilyGenerator};

use super::schedule::CronSchedule;
use super::utils::{ResourceKind, info, list, optional_gauge, string, timestamp};
use crate::values::timestamp_seconds;

#[cfg(test)]
#[path = "./cronjobs.tests.rs"]
mod cronjobs_tests;

const KIND: ResourceKind = ResourceKind::new("kube_cronjob", &["namespace", "cronjob"]);

/// Returns metric family generators for the `cronjobs` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("info", "Info about cronjob.", |c| {
            let spec = &c.data["spec"];
            info(
                &["schedule", "concurrency_policy", "timezone"],
                vec![
                    string(&spec["schedule"]).to_owned(),
                    string(&spec["concurrencyPolicy"]).to_owned(),
                    spec["timeZone"].as_str().unwrap_or("local").to_owned(),
                ],
            )
        })
        .stable(),
        KIND.created(),
        KIND.gauge("status_active", "Active holds pointers to currently running jobs.", |c| {
            Family::single(list(&c.data["status"]["active"]).len() as f64)
        })
        .stable(),
        KIND.gauge(
            "status_last_schedule_time",
            "LastScheduleTime keeps information of when was the last time the job was successfully scheduled.",
            |c| optional_gauge(timestamp(&c.data["status"]["lastScheduleTime"])),
        )
        .stable(),
        KIND.gauge(
            "status_last_successful_time",
            "LastSuccessfulTime keeps information of when was the last time the job was completed successfully.",
            |c| optional_gauge(timestamp(&c.data["status"]["lastSuccessfulTime"])),
        ),
        KIND.gauge(
            "spec_suspend",
            "Suspend flag tells the controller to suspend subsequent executions.",
            |c| optional_gauge(c.data["spec"]["suspend"].as_bool().map(bool_value)),
        )
        .stable(),
        KIND.gauge(
            "spec_starting_deadline_seconds",
            "Deadline in seconds for starting the job if it misses scheduled time for any reason.",
            |c| optional_gauge(c.data["spec"]["startingDeadlineSeconds"].as_f64()),
        )
        .stable(),
        KIND.gauge(
            "next_schedule_time",
            "Next time the cronjob should be scheduled. The time after lastScheduleTime, or after the cron job's creation time if it's never been scheduled. Use this to determine if the job is delayed.",
            |c| optional_gauge(next_schedule_time(c)),
        )
        .stable(),
        KIND.resource_version("Resource version representing a specific version of the cronjob.")
            .stable(),
        KIND.gauge(
            "spec_successful_job_history_limit",
            "Successful job history limit tells the controller how many completed jobs should be preserved.",
            |c| optional_gauge(c.data["spec"]["successfulJobsHistoryLimit"].as_f64()),
        ),
        KIND.gauge(
            "spec_failed_job_history_limit",
            "Failed job history limit tells the controller how many failed jobs should be preserved.",
            |c| optional_gauge(c.data["spec"]["failedJobsHistoryLimit"].as_f64()),
        ),
    ]
}

/// Next scheduled run after the last one, or after creation if the cronjob never ran.
fn next_schedule_time(object: &DynamicObject) -> Option<f64> {
    let schedule = CronSchedule::parse(string(&object.data["spec"]["schedule"]))?;
    let last = object.data["status"]["lastScheduleTime"]
        .as_str()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
        .or_else(|| object.metadata.creation_timestamp.as_ref().map(|t| t.0))?;

    schedule.next_after(last).map(|t| timestamp_seconds(&t))
}
