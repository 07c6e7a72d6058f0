use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

#[test]
fn resource_quota_test() {
    let generators = generators(&[], &[]);
    let quota = object(json!({
        "apiVersion": "v1",
        "kind": "ResourceQuota",
        "metadata": { "name": "compute", "namespace": "team-a" },
        "status": {
            "hard": { "limits.memory": "2Gi", "pods": "10" },
            "used": { "pods": "4" }
        }
    }));

    assert_eq!(
        "kube_resourcequota{namespace=\"team-a\",resourcequota=\"compute\",resource=\"limits.memory\",type=\"hard\"} 2147483648\n\
         kube_resourcequota{namespace=\"team-a\",resourcequota=\"compute\",resource=\"pods\",type=\"hard\"} 10\n\
         kube_resourcequota{namespace=\"team-a\",resourcequota=\"compute\",resource=\"pods\",type=\"used\"} 4\n",
        render(&generators, "kube_resourcequota", &quota)
    );
}

#[test]
fn resource_quota_without_status_test() {
    let generators = generators(&[], &[]);
    let quota = object(json!({
        "apiVersion": "v1",
        "kind": "ResourceQuota",
        "metadata": { "name": "compute", "namespace": "team-a" }
    }));

    assert_eq!("", render(&generators, "kube_resourcequota", &quota));
}
