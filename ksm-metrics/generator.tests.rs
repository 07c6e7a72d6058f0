use super::*;
use crate::Metric;

struct Object {
    replicas: i32,
}

fn generators() -> Vec<FamilyGenerator<Object>> {
    vec![
        FamilyGenerator::new("kube_object_replicas", "Number of replicas.", MetricType::Gauge, |o: &Object| {
            Family::single(f64::from(o.replicas))
        })
        .stable(),
        FamilyGenerator::new("kube_object_info", "Object information.", MetricType::Info, |_: &Object| {
            Family::from_metrics(vec![Metric::with_labels(&["name"], vec!["test".into()], 1.0)])
        })
        .deprecated("2.10.0"),
    ]
}

#[test]
fn header_test() {
    let headers = extract_headers(&generators());

    let mut out = String::new();
    headers[0].write(ContentType::Text, &mut out);
    headers[1].write(ContentType::Text, &mut out);
    assert_eq!(
        "# HELP kube_object_replicas [STABLE] Number of replicas.\n\
         # TYPE kube_object_replicas gauge\n\
         # HELP kube_object_info (Deprecated since 2.10.0) Object information.\n\
         # TYPE kube_object_info gauge\n",
        out
    );

    let mut out = String::new();
    headers[1].write(ContentType::OpenMetrics, &mut out);
    assert!(out.ends_with("# TYPE kube_object_info info\n"));
}

#[test]
fn alpha_header_test() {
    let generator = generators().remove(0).alpha();

    assert_eq!("Number of replicas.", generator.header().help);
}

#[test]
fn compose_test() {
    let generate = compose_metric_gen_fns(generators());
    let families = generate(&Object { replicas: 3 });

    assert_eq!(2, families.len());
    assert_eq!("kube_object_replicas 3\n", families[0].render());
    assert_eq!("kube_object_info{name=\"test\"} 1\n", families[1].render());
    assert_eq!(MetricType::Info, families[1].metric_type);
}

#[test]
fn filter_test() {
    let filtered = filter_metric_families(generators(), |g| g.name.ends_with("_info"));

    assert_eq!(1, filtered.len());
    assert_eq!("kube_object_info", filtered[0].name);
}
