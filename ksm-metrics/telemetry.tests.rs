use super::*;

#[test]
fn render_test() {
    let telemetry = Telemetry::new("0.1.0").unwrap();
    telemetry.record_list("v1/pods", CallResult::Success);
    telemetry.record_watch("v1/pods", CallResult::Error);
    telemetry.discovery_add_events.inc();
    telemetry.discovery_cache.set(3);

    let out = telemetry.render().unwrap();
    assert!(out.contains("kube_state_metrics_list_total{resource=\"v1/pods\",result=\"success\"} 1"));
    assert!(out.contains("kube_state_metrics_watch_total{resource=\"v1/pods\",result=\"error\"} 1"));
    assert!(out.contains("kube_state_metrics_custom_resource_state_add_events_total 1"));
    assert!(out.contains("kube_state_metrics_custom_resource_state_cache 3"));
    assert!(out.contains("kube_state_metrics_build_info{version=\"0.1.0\"} 1"));
}

#[test]
fn config_load_test() {
    let telemetry = Telemetry::new("0.1.0").unwrap();
    telemetry.record_config_load("config", "/etc/ksm.yaml", Some(42.0), 1_700_000_000.0);
    assert_eq!(
        1.0,
        telemetry
            .config_reload_successful
            .with_label_values(&["config", "/etc/ksm.yaml"])
            .get()
    );
    assert_eq!(42.0, telemetry.config_hash.with_label_values(&["config", "/etc/ksm.yaml"]).get());

    telemetry.record_config_load("config", "/etc/ksm.yaml", None, 1_700_000_100.0);
    assert_eq!(
        0.0,
        telemetry
            .config_reload_successful
            .with_label_values(&["config", "/etc/ksm.yaml"])
            .get()
    );
    assert_eq!(
        1_700_000_000.0,
        telemetry
            .config_reload_success_timestamp
            .with_label_values(&["config", "/etc/ksm.yaml"])
            .get()
    );
}

#[test]
fn sharding_test() {
    let telemetry = Telemetry::new("0.1.0").unwrap();
    telemetry.record_sharding(1, 3);
    telemetry.record_sharding(2, 3);

    let out = telemetry.render().unwrap();
    assert!(out.contains("kube_state_metrics_shard_ordinal{shard_ordinal=\"2\"} 2"));
    assert!(!out.contains("kube_state_metrics_shard_ordinal{shard_ordinal=\"1\"}"));
    assert!(out.contains("kube_state_metrics_total_shards 3"));
}
