use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

#[test]
fn limit_range_test() {
    let generators = generators(&["*".to_owned()], &[]);
    let limit_range = object(json!({
        "apiVersion": "v1",
        "kind": "LimitRange",
        "metadata": { "name": "limits", "namespace": "team-a", "creationTimestamp": "2024-01-01T00:00:00Z" },
        "spec": {
            "limits": [{
                "type": "Container",
                "min": { "cpu": "100m" },
                "max": { "memory": "1Gi" },
                "defaultRequest": { "cpu": "250m" }
            }]
        }
    }));

    assert_eq!(
        "kube_limitrange{namespace=\"team-a\",limitrange=\"limits\",resource=\"cpu\",type=\"Container\",constraint=\"min\"} 0.1\n\
         kube_limitrange{namespace=\"team-a\",limitrange=\"limits\",resource=\"memory\",type=\"Container\",constraint=\"max\"} 1073741824\n\
         kube_limitrange{namespace=\"team-a\",limitrange=\"limits\",resource=\"cpu\",type=\"Container\",constraint=\"defaultRequest\"} 0.25\n",
        render(&generators, "kube_limitrange", &limit_range)
    );
    assert_eq!(
        "kube_limitrange_created{namespace=\"team-a\",limitrange=\"limits\"} 1704067200\n",
        render(&generators, "kube_limitrange_created", &limit_range)
    );
    assert_eq!(2, generators.len());
}
