use openstack_exporter::collectors::{MetricDesc, Sample, ValueKind};
use openstack_exporter::metrics::MetricsCollector;

const LABELS: [&str; 4] = ["id", "binary", "service_host", "zone"];

fn compute_descs() -> Vec<MetricDesc> {
    vec![
        MetricDesc::new(
            "openstack",
            "compute",
            "up",
            "Status of compute services",
            ValueKind::Gauge,
            &LABELS,
        ),
        MetricDesc::new(
            "openstack",
            "compute",
            "enabled",
            "Admin status of compute services",
            ValueKind::Gauge,
            &LABELS,
        ),
        MetricDesc::new(
            "openstack",
            "compute",
            "last_seen",
            "Last time the service was seen by OpenStack",
            ValueKind::Counter,
            &LABELS,
        ),
    ]
}

fn create_test_metrics() -> MetricsCollector {
    MetricsCollector::new("openstack", &compute_descs()).expect("Failed to create metrics collector")
}

#[test]
fn test_metrics_registration() {
    // Verify that all metrics can be created and registered without panicking
    let metrics = create_test_metrics();

    // Scalar metrics like openstack_up always appear, vectors only once set
    let output = metrics.render().expect("Failed to render metrics");
    assert!(output.contains("openstack_up"), "Missing openstack_up metric");
    assert!(!output.contains("openstack_compute_up{"));
}

#[test]
fn test_duplicate_descriptors_are_rejected() {
    // Given: The same family described twice
    let mut descs = compute_descs();
    descs.push(descs[0].clone());

    // Then: Registration fails before any scrape
    assert!(MetricsCollector::new("openstack", &descs).is_err());
}

#[test]
fn test_descriptor_clashing_with_health_metric_is_rejected() {
    let descs = vec![MetricDesc::new("openstack", "", "up", "clash", ValueKind::Gauge, &[])];
    assert!(MetricsCollector::new("openstack", &descs).is_err());
}

#[test]
fn test_apply_renders_exposition_lines() {
    let metrics = create_test_metrics();
    let descs = compute_descs();
    let labels = ["s1", "nova-compute", "h1", "az1"];

    let applied = metrics.apply(&[
        Sample::new(&descs[0], 1.0, &labels),
        Sample::new(&descs[1], 0.0, &labels),
        Sample::new(&descs[2], 1_700_000_000.0, &labels),
    ]);
    assert_eq!(applied, 3);

    let rendered = metrics.render().unwrap();
    let series = r#"{binary="nova-compute",id="s1",service_host="h1",zone="az1"}"#;
    assert!(rendered.contains(&format!("openstack_compute_up{} 1\n", series)));
    assert!(rendered.contains(&format!("openstack_compute_enabled{} 0\n", series)));
    assert!(rendered.contains(&format!("openstack_compute_last_seen{} 1700000000\n", series)));
    assert!(rendered.contains("# TYPE openstack_compute_last_seen counter"));
    assert!(rendered.contains("# TYPE openstack_compute_up gauge"));
}

#[test]
fn test_counter_value_is_replaced_not_accumulated() {
    let metrics = create_test_metrics();
    let descs = compute_descs();
    let labels = ["s1", "nova-compute", "h1", "az1"];

    metrics.apply(&[Sample::new(&descs[2], 1_700_000_000.0, &labels)]);
    metrics.apply(&[Sample::new(&descs[2], 1_700_000_060.0, &labels)]);

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("} 1700000060\n"));
    assert!(!rendered.contains("3400000060"));
}

#[test]
fn test_unknown_sample_is_ignored() {
    let metrics = create_test_metrics();
    let stray = MetricDesc::new("openstack", "network", "up", "n/a", ValueKind::Gauge, &["id"]);

    assert_eq!(metrics.apply(&[Sample::new(&stray, 1.0, &["x"])]), 0);
    assert!(!metrics.render().unwrap().contains("openstack_network_up"));
}

#[test]
fn test_metrics_reset() {
    let metrics = create_test_metrics();
    let descs = compute_descs();

    metrics.apply(&[Sample::new(&descs[0], 1.0, &["s1", "nova-compute", "h1", "az1"])]);

    // Reset should clear collector series
    metrics.reset();

    let rendered = metrics.render().expect("Failed to render after reset");
    assert!(!rendered.contains("id=\"s1\""));
}

#[test]
fn test_replace_swaps_previous_cycle() {
    let metrics = create_test_metrics();
    let descs = compute_descs();

    metrics.replace(&[Sample::new(&descs[0], 1.0, &["s1", "nova-compute", "h1", "az1"])]);
    let applied = metrics.replace(&[Sample::new(&descs[0], 0.0, &["s2", "nova-compute", "h2", "az1"])]);

    let rendered = metrics.render().unwrap();
    assert_eq!(applied, 1);
    assert!(!rendered.contains("id=\"s1\""));
    assert!(rendered.contains("id=\"s2\""));
}
