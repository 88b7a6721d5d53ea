use k8s_openapi::Resource as _;

use super::*;

const POD_METRICS: &str = r#"{
    "kind": "PodMetrics",
    "apiVersion": "metrics.k8s.io/v1beta1",
    "metadata": {
        "name": "rstudio-7d9c6b5f4-x2x8q",
        "namespace": "user-alice",
        "creationTimestamp": "2018-02-07T11:44:20Z",
        "labels": {"app": "rstudio"}
    },
    "timestamp": "2018-02-07T11:44:00Z",
    "window": "30s",
    "containers": [
        {"name": "rstudio", "usage": {"cpu": "100m", "memory": "512Mi"}},
        {"name": "auth-proxy", "usage": {"cpu": "100000000n", "memory": "16Mi"}}
    ]
}"#;

#[test]
fn deserialize_pod_metrics() {
    let metrics: PodMetrics = serde_json::from_str(POD_METRICS).unwrap();

    assert_eq!(metrics.metadata.name.as_deref(), Some("rstudio-7d9c6b5f4-x2x8q"));
    assert_eq!(metrics.metadata.namespace.as_deref(), Some("user-alice"));
    assert!(metrics.timestamp.is_some());
    assert_eq!(metrics.window, Duration::from_secs(30));
    assert_eq!(metrics.containers.len(), 2);
    assert_eq!(metrics.containers[0].name, "rstudio");
    assert_eq!(metrics.containers[1].cpu(), Ok(100.0));
}

#[test]
fn pod_cpu_sums_containers() {
    let metrics: PodMetrics = serde_json::from_str(POD_METRICS).unwrap();
    assert_eq!(metrics.cpu(), Ok(200.0));
}

#[test]
fn pod_cpu_fails_on_unknown_unit() {
    let metrics = PodMetrics::new("pod", "default")
        .containers([Container::new("a", "10m"), Container::new("b", "1.5")]);
    let err = metrics.cpu().unwrap_err();
    assert_eq!(err.quantity(), "1.5");
}

#[test]
fn empty_pod_has_no_usage() {
    let metrics = PodMetrics::new("pod", "default");
    assert_eq!(metrics.cpu(), Ok(0.0));
}

#[test]
fn fractional_window() {
    let json = r#"{"metadata": {"name": "p"}, "window": "1.5s", "containers": []}"#;
    let metrics: PodMetrics = serde_json::from_str(json).unwrap();
    assert_eq!(metrics.window, Duration::from_millis(1_500));
}

#[test]
fn serialize_window() {
    let metrics = PodMetrics {
        window: Duration::from_secs(30),
        ..PodMetrics::new("p", "default")
    };
    let value = serde_json::to_value(&metrics).unwrap();
    assert_eq!(value["window"], "30s");
    assert!(value.get("timestamp").is_none());
}

#[test]
fn resource_identity() {
    assert_eq!(PodMetrics::API_VERSION, "metrics.k8s.io/v1beta1");
    assert_eq!(PodMetrics::GROUP, METRICS_API_GROUP);
    assert_eq!(PodMetrics::VERSION, METRICS_API_VERSION);
    assert_eq!(PodMetrics::KIND, "PodMetrics");
    assert_eq!(PodMetrics::URL_PATH_SEGMENT, "pods");
}
