use super::*;
use crate::{FamilyGenerator, MetricType, compose_metric_gen_fns, extract_headers};

struct Object {
    name: &'static str,
    replicas: i32,
}

fn store() -> MetricsStore<Object> {
    let generators = vec![FamilyGenerator::new(
        "kube_object_replicas",
        "Number of replicas.",
        MetricType::Gauge,
        |o: &Object| {
            let mut family = Family::single(f64::from(o.replicas));
            family.metrics[0].prepend_labels(&["name"], &[o.name]);
            family
        },
    )];

    MetricsStore::new(extract_headers(&generators), compose_metric_gen_fns(generators))
}

#[test]
fn add_update_delete_test() {
    let store = store();
    store.add("1", &Object { name: "a", replicas: 1 });
    store.add("1", &Object { name: "a", replicas: 2 });
    assert_eq!(1, store.len());

    let mut out = String::new();
    store.write_all(ContentType::Text, &mut out);
    assert_eq!(
        "# HELP kube_object_replicas Number of replicas.\n\
         # TYPE kube_object_replicas gauge\n\
         kube_object_replicas{name=\"a\"} 2\n",
        out
    );

    store.delete("1");
    assert!(store.is_empty());

    let mut out = String::new();
    store.write_all(ContentType::Text, &mut out);
    assert_eq!(
        "# HELP kube_object_replicas Number of replicas.\n# TYPE kube_object_replicas gauge\n",
        out
    );
}

#[test]
fn replace_test() {
    let store = store();
    store.add("old", &Object { name: "old", replicas: 1 });

    let a = Object { name: "a", replicas: 1 };
    let b = Object { name: "b", replicas: 2 };
    store.replace([("a", &a), ("b", &b)]);

    assert_eq!(2, store.len());
    let mut out = String::new();
    store.write_all(ContentType::Text, &mut out);
    assert!(!out.contains("old"));
    assert!(out.contains("kube_object_replicas{name=\"b\"} 2\n"));
}
