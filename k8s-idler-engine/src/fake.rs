//! In-memory cluster recording every call made against it.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Mutex;

use k8s::metav1;
use k8s::resource;
use k8s::ObjectMetaExt as _;
use k8s_idler_kubeapi::Result;

use super::*;

#[derive(Debug, Default)]
pub(crate) struct FakeCluster {
    pods: Vec<corev1::Pod>,
    metrics: Vec<metricsv1::PodMetrics>,
    deployments: Mutex<Vec<appsv1::Deployment>>,
    services: Mutex<Vec<corev1::Service>>,
    failing_services: HashSet<ObjectKey>,
    failing_listings: bool,
    selectors: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub(crate) fn with_pod(mut self, pod: corev1::Pod) -> Self {
        self.pods.push(pod);
        self
    }

    pub(crate) fn with_pod_metrics(mut self, metrics: metricsv1::PodMetrics) -> Self {
        self.metrics.push(metrics);
        self
    }

    pub(crate) fn with_deployment(self, deployment: appsv1::Deployment) -> Self {
        push(&self.deployments, deployment);
        self
    }

    pub(crate) fn with_service(self, service: corev1::Service) -> Self {
        push(&self.services, service);
        self
    }

    /// Running workload `name` with its pod, metrics and service
    pub(crate) fn with_workload(
        self,
        name: &str,
        namespace: &str,
        replicas: i32,
        limits: &[&str],
        usage: &[&str],
    ) -> Self {
        let pod_name = format!("{name}-7d9c6b5f4-x2x8q");
        let pod = pod(&pod_name, namespace, name);
        let mut metrics = pod_metrics(&pod_name, namespace, usage);
        // metrics-server copies the pod labels
        metrics.metadata.labels.clone_from(&pod.metadata.labels);
        self.with_pod(pod)
            .with_pod_metrics(metrics)
            .with_deployment(deployment(name, namespace, replicas, limits))
            .with_service(service(name, namespace))
    }

    /// Patching the service `name` is rejected
    pub(crate) fn failing_service(mut self, name: &str, namespace: &str) -> Self {
        self.failing_services
            .insert(ObjectKey::new(name, namespace));
        self
    }

    pub(crate) fn failing_listings(mut self) -> Self {
        self.failing_listings = true;
        self
    }

    pub(crate) fn selectors(&self) -> Vec<String> {
        lock(&self.selectors).clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub(crate) fn deployment(&self, name: &str, namespace: &str) -> Option<appsv1::Deployment> {
        let key = ObjectKey::new(name, namespace);
        find(lock(&self.deployments).as_slice(), &key, |d| &d.metadata).cloned()
    }

    pub(crate) fn service(&self, name: &str, namespace: &str) -> Option<corev1::Service> {
        let key = ObjectKey::new(name, namespace);
        find(lock(&self.services).as_slice(), &key, |s| &s.metadata).cloned()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn list<T: Clone>(
        &self,
        selector: &str,
        items: &[T],
        metadata: impl Fn(&T) -> &metav1::ObjectMeta,
    ) -> Result<Vec<T>> {
        lock(&self.selectors).push(selector.to_string());
        if self.failing_listings {
            return Err(ApiError::not_found::<corev1::Pod>(&ObjectKey::default()));
        }
        let items = items
            .iter()
            .filter(|item| matches(selector, metadata(item).labels.as_ref()))
            .cloned()
            .collect();
        Ok(items)
    }
}

impl ClusterApi for FakeCluster {
    async fn list_pods(&self, selector: &str) -> Result<Vec<corev1::Pod>> {
        self.list(selector, &self.pods, |pod| &pod.metadata)
    }

    async fn list_pod_metrics(&self, selector: &str) -> Result<Vec<metricsv1::PodMetrics>> {
        self.list(selector, &self.metrics, |metrics| &metrics.metadata)
    }

    async fn list_deployments(&self, selector: &str) -> Result<Vec<appsv1::Deployment>> {
        let deployments = lock(&self.deployments).clone();
        self.list(selector, &deployments, |deployment| &deployment.metadata)
    }

    async fn get_service(&self, key: &ObjectKey) -> Result<corev1::Service> {
        self.record(format!("get service {key}"));
        find(lock(&self.services).as_slice(), key, |s| &s.metadata)
            .cloned()
            .ok_or_else(|| ApiError::not_found::<corev1::Service>(key))
    }

    async fn patch_service(
        &self,
        key: &ObjectKey,
        patch: &ServiceRedirect,
    ) -> Result<corev1::Service> {
        self.record(format!("patch service {key}"));
        if self.failing_services.contains(key) {
            return Err(ApiError::not_found::<corev1::Service>(key));
        }
        let mut services = lock(&self.services);
        let service = find_mut(services.as_mut_slice(), key, |s| &s.metadata)
            .ok_or_else(|| ApiError::not_found::<corev1::Service>(key))?;
        patch.apply(service);
        Ok(service.clone())
    }

    async fn patch_deployment(
        &self,
        key: &ObjectKey,
        patch: &ScaleToZero,
    ) -> Result<appsv1::Deployment> {
        self.record(format!("patch deployment {key}"));
        let mut deployments = lock(&self.deployments);
        let deployment = find_mut(deployments.as_mut_slice(), key, |d| &d.metadata)
            .ok_or_else(|| ApiError::not_found::<appsv1::Deployment>(key))?;
        patch.apply(deployment);
        Ok(deployment.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push<T>(items: &Mutex<Vec<T>>, item: T) {
    lock(items).push(item);
}

fn find<'a, T>(
    items: &'a [T],
    key: &ObjectKey,
    metadata: impl Fn(&T) -> &metav1::ObjectMeta,
) -> Option<&'a T> {
    items.iter().find(|item| ObjectKey::of(metadata(item)) == *key)
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    key: &ObjectKey,
    metadata: impl Fn(&T) -> &metav1::ObjectMeta,
) -> Option<&'a mut T> {
    items
        .iter_mut()
        .find(|item| ObjectKey::of(metadata(item)) == *key)
}

/// Equality based label selector: `k=v`, `k==v`, `k!=v`, `k` and `!k`
fn matches(selector: &str, labels: Option<&BTreeMap<String, String>>) -> bool {
    let value = |key: &str| labels.and_then(|labels| labels.get(key.trim()));
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, expected)) = term.split_once("!=") {
                value(key).map(String::as_str) != Some(expected.trim())
            } else if let Some((key, expected)) = term.split_once('=') {
                let expected = expected.trim_start_matches('=').trim();
                value(key).map(String::as_str) == Some(expected)
            } else if let Some(key) = term.strip_prefix('!') {
                value(key).is_none()
            } else {
                value(term).is_some()
            }
        })
}

pub(crate) fn pod(name: &str, namespace: &str, app: &str) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta::with_namespace(name, namespace)
            .label(labels::APP, app)
            .label(labels::IDLEABLE, "true"),
        ..k8s::default()
    }
}

pub(crate) fn pod_metrics(name: &str, namespace: &str, usage: &[&str]) -> metricsv1::PodMetrics {
    let containers = usage
        .iter()
        .enumerate()
        .map(|(idx, cpu)| metricsv1::Container::new(format!("container-{idx}"), cpu));
    metricsv1::PodMetrics::new(name, namespace).containers(containers)
}

pub(crate) fn deployment(
    name: &str,
    namespace: &str,
    replicas: i32,
    limits: &[&str],
) -> appsv1::Deployment {
    let containers = limits
        .iter()
        .enumerate()
        .map(|(idx, limit)| corev1::Container {
            name: format!("container-{idx}"),
            resources: Some(corev1::ResourceRequirements {
                limits: Some(BTreeMap::from([(
                    "cpu".to_string(),
                    resource::Quantity(limit.to_string()),
                )])),
                ..k8s::default()
            }),
            ..k8s::default()
        })
        .collect();
    let template = corev1::PodTemplateSpec {
        spec: Some(corev1::PodSpec {
            containers,
            ..k8s::default()
        }),
        ..k8s::default()
    };
    appsv1::Deployment {
        metadata: metav1::ObjectMeta::with_namespace(name, namespace)
            .label(labels::APP, name)
            .label(labels::IDLEABLE, "true"),
        spec: Some(appsv1::DeploymentSpec {
            replicas: Some(replicas),
            template,
            ..k8s::default()
        }),
        ..k8s::default()
    }
}

pub(crate) fn idled(deployment: appsv1::Deployment) -> appsv1::Deployment {
    let metadata = deployment.metadata.label(labels::IDLED, "true");
    appsv1::Deployment {
        metadata,
        ..deployment
    }
}

pub(crate) fn service(name: &str, namespace: &str) -> corev1::Service {
    corev1::Service {
        metadata: metav1::ObjectMeta::with_namespace(name, namespace),
        spec: Some(corev1::ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            cluster_ip: Some("10.0.0.12".to_string()),
            selector: Some(BTreeMap::from([(labels::APP.to_string(), name.to_string())])),
            ..k8s::default()
        }),
        ..k8s::default()
    }
}

#[test]
fn selector_matching() {
    let labels = BTreeMap::from([
        ("app".to_string(), "rstudio".to_string()),
        ("tier".to_string(), "web".to_string()),
    ]);
    let labels = Some(&labels);

    assert!(matches("", labels));
    assert!(matches("app=rstudio", labels));
    assert!(matches("app==rstudio", labels));
    assert!(matches("app", labels));
    assert!(matches("!mojanalytics.xyz/idled,app=rstudio", labels));
    assert!(matches("tier!=db", labels));
    assert!(!matches("app=jupyter", labels));
    assert!(!matches("!app", labels));
    assert!(!matches("tier!=web", labels));
    assert!(!matches("app", None));
    assert!(matches("!app", None));
}
