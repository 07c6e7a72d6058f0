use super::*;
use crate::{Family, FamilyGenerator, Metric, MetricType, compose_metric_gen_fns, extract_headers};

struct Object {
    namespace: &'static str,
}

fn store() -> Arc<MetricsStore<Object>> {
    let generators = vec![
        FamilyGenerator::new("kube_object_info", "Object information.", MetricType::Info, |o: &Object| {
            Family::from_metrics(vec![Metric::with_labels(&["namespace"], vec![o.namespace.to_owned()], 1.0)])
        }),
        FamilyGenerator::new("kube_object_created", "Creation time.", MetricType::Gauge, |_: &Object| {
            Family::single(10.0)
        }),
    ];

    Arc::new(MetricsStore::new(
        extract_headers(&generators),
        compose_metric_gen_fns(generators),
    ))
}

#[test]
fn multi_store_writes_headers_once_test() {
    let first = store();
    first.add("1", &Object { namespace: "ns1" });
    let second = store();
    second.add("2", &Object { namespace: "ns2" });

    let writer = MultiStoreMetricsWriter::new(vec![first, second]);
    let mut out = String::new();
    writer.write_all(&mut out, ContentType::Text);

    assert_eq!(
        "# HELP kube_object_info Object information.\n\
         # TYPE kube_object_info gauge\n\
         kube_object_info{namespace=\"ns1\"} 1\n\
         kube_object_info{namespace=\"ns2\"} 1\n\
         # HELP kube_object_created Creation time.\n\
         # TYPE kube_object_created gauge\n\
         kube_object_created 10\n\
         kube_object_created 10\n",
        out
    );
}

#[test]
fn empty_writer_test() {
    let writer = MultiStoreMetricsWriter::<Object>::new(Vec::new());
    let mut out = String::new();
    writer.write_all(&mut out, ContentType::Text);
    assert_eq!("", out);
}

#[test]
fn write_exposition_openmetrics_test() {
    let store = store();
    store.add("1", &Object { namespace: "ns1" });
    let writers: Vec<Arc<dyn MetricsWriter>> = vec![Arc::new(MultiStoreMetricsWriter::new(vec![store]))];

    let out = write_exposition(&writers, ContentType::OpenMetrics);
    assert!(out.starts_with("# HELP kube_object_info Object information.\n# TYPE kube_object_info info\n"));
    assert!(out.ends_with("kube_object_created 10\n# EOF\n"));
}
