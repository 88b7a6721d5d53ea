use super::*;

/// Resource usage of a pod's containers as reported by `metrics.k8s.io`
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PodMetrics {
    pub metadata: metav1::ObjectMeta,

    /// The following fields define time interval from which metrics were
    /// collected from the interval [Timestamp-Window, Timestamp].
    ///
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<metav1::Time>,

    #[serde(default, with = "duration")]
    pub window: Duration,

    /// Metrics for all containers are collected within the same time window.
    ///
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl PodMetrics {
    pub fn new(name: impl ToString, namespace: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..metav1::ObjectMeta::default()
        };
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn containers(self, containers: impl IntoIterator<Item = Container>) -> Self {
        let containers = containers.into_iter().collect();
        Self { containers, ..self }
    }

    /// Total CPU usage of all the containers in millicores
    ///
    /// Fails on the first container whose usage cannot be normalized.
    pub fn cpu(&self) -> Result<f64, QuantityParseError> {
        self.containers
            .iter()
            .try_fold(0.0, |total, container| container.cpu().map(|cpu| total + cpu))
    }
}

impl k8s_openapi::Resource for PodMetrics {
    const API_VERSION: &'static str = METRICS_API_GROUP_VERSION;
    const GROUP: &'static str = METRICS_API_GROUP;
    const KIND: &'static str = "PodMetrics";
    const VERSION: &'static str = METRICS_API_VERSION;
    const URL_PATH_SEGMENT: &'static str = "pods";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::ListableResource for PodMetrics {
    const LIST_KIND: &'static str = "PodMetricsList";
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = metav1::ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}
