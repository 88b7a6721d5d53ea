use std::collections::BTreeMap;

pub use k8s_idler_metrics::v1beta1 as metricsv1;
pub use k8s_idler_metrics::QuantityExt;
pub use k8s_idler_metrics::QuantityParseError;
pub use k8s_openapi as openapi;
pub use k8s_openapi::api::apps::v1 as appsv1;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::api::resource;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use key::ObjectKey;

pub mod annotations;
pub mod labels;

mod key;

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn label(self, key: impl ToString, value: impl ToString) -> Self;
    fn label_value(&self, key: &str) -> Option<&str>;
    fn annotation_value(&self, key: &str) -> Option<&str>;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn label(self, key: impl ToString, value: impl ToString) -> Self {
        let mut labels = self.labels.unwrap_or_default();
        labels.insert(key.to_string(), value.to_string());
        Self {
            labels: Some(labels),
            ..self
        }
    }

    fn label_value(&self, key: &str) -> Option<&str> {
        lookup(self.labels.as_ref(), key)
    }

    fn annotation_value(&self, key: &str) -> Option<&str> {
        lookup(self.annotations.as_ref(), key)
    }
}

pub trait DeploymentExt {
    /// Desired replica count, defaulted the same way the API server does
    fn replicas(&self) -> i32;

    /// Containers of the pod template
    fn containers(&self) -> &[corev1::Container];
}

impl DeploymentExt for appsv1::Deployment {
    fn replicas(&self) -> i32 {
        self.spec
            .as_ref()
            .and_then(|spec| spec.replicas)
            .unwrap_or(1)
    }

    fn containers(&self) -> &[corev1::Container] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default()
    }
}

pub trait ContainerExt {
    /// Declared CPU limit, if any
    fn cpu_limit(&self) -> Option<&resource::Quantity>;
}

impl ContainerExt for corev1::Container {
    fn cpu_limit(&self) -> Option<&resource::Quantity> {
        self.resources
            .as_ref()
            .and_then(|resources| resources.limits.as_ref())
            .and_then(|limits| limits.get("cpu"))
    }
}

fn lookup<'a>(map: Option<&'a BTreeMap<String, String>>, key: &str) -> Option<&'a str> {
    map.and_then(|map| map.get(key)).map(String::as_str)
}

pub fn default<T: Default>() -> T {
    T::default()
}
