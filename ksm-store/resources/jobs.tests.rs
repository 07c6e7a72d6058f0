use k8s_openapi::serde_json::{Value, json};
use rstest::rstest;

use super::*;
use crate::resources::testing::{object, render};

fn job(status: Value) -> DynamicObject {
    object(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": { "name": "migrate", "namespace": "db" },
        "spec": { "parallelism": 2 },
        "status": status
    }))
}

#[test]
fn status_failed_without_failures_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_job_status_failed{namespace=\"db\",job_name=\"migrate\"} 0\n",
        render(&generators, "kube_job_status_failed", &job(json!({})))
    );
}

#[rstest]
#[case("DeadlineExceeded", "0", "1", "0", "")]
#[case(
    "PodFailurePolicy",
    "0",
    "0",
    "0",
    "kube_job_status_failed{namespace=\"db\",job_name=\"migrate\",reason=\"\"} 3\n"
)]
fn status_failed_reasons_test(
    #[case] reason: &str,
    #[case] backoff: &str,
    #[case] deadline: &str,
    #[case] evicted: &str,
    #[case] unknown: &str,
) {
    let generators = generators(&[], &[]);
    let job = job(json!({
        "failed": 3,
        "conditions": [{ "type": "Failed", "status": "True", "reason": reason }]
    }));

    let expected = format!(
        "kube_job_status_failed{{namespace=\"db\",job_name=\"migrate\",reason=\"BackoffLimitExceeded\"}} {backoff}\n\
         kube_job_status_failed{{namespace=\"db\",job_name=\"migrate\",reason=\"DeadlineExceeded\"}} {deadline}\n\
         kube_job_status_failed{{namespace=\"db\",job_name=\"migrate\",reason=\"Evicted\"}} {evicted}\n{unknown}"
    );
    assert_eq!(expected, render(&generators, "kube_job_status_failed", &job));
}

#[test]
fn complete_condition_test() {
    let generators = generators(&[], &[]);
    let job = job(json!({ "conditions": [{ "type": "Complete", "status": "True" }] }));

    assert_eq!(
        "kube_job_complete{namespace=\"db\",job_name=\"migrate\",condition=\"true\"} 1\n\
         kube_job_complete{namespace=\"db\",job_name=\"migrate\",condition=\"false\"} 0\n\
         kube_job_complete{namespace=\"db\",job_name=\"migrate\",condition=\"unknown\"} 0\n",
        render(&generators, "kube_job_complete", &job)
    );
    assert_eq!("", render(&generators, "kube_job_failed", &job));
}

#[test]
fn optional_spec_test() {
    let generators = generators(&[], &[]);
    let job = job(json!({}));

    assert_eq!(
        "kube_job_spec_parallelism{namespace=\"db\",job_name=\"migrate\"} 2\n",
        render(&generators, "kube_job_spec_parallelism", &job)
    );
    assert_eq!("", render(&generators, "kube_job_spec_completions", &job));
    assert_eq!(
        "kube_job_owner{namespace=\"db\",job_name=\"migrate\",owner_kind=\"<none>\",owner_name=\"<none>\",owner_is_controller=\"<none>\"} 1\n",
        render(&generators, "kube_job_owner", &job)
    );
}
