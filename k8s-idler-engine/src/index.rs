use super::*;

/// Label selector of everything eligible for idling: `base` minus whatever
/// already carries the idled marker.
///
/// # Examples
///
/// ```
/// use k8s_idler_engine::eligible_selector;
///
/// assert_eq!(eligible_selector("app=rstudio"), "!mojanalytics.xyz/idled,app=rstudio");
/// assert_eq!(eligible_selector(""), "!mojanalytics.xyz/idled");
/// ```
pub fn eligible_selector(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        format!("!{}", labels::IDLED)
    } else {
        format!("!{},{base}", labels::IDLED)
    }
}

/// Lookup tables built from one snapshot of the cluster.
///
/// Pods, pod metrics and deployments are listed with the same selector so
/// their keyspaces line up. Built once per run and never refreshed.
#[derive(Debug, Default)]
pub struct Index {
    usage: HashMap<ObjectKey, metricsv1::PodMetrics>,
    workloads: Vec<appsv1::Deployment>,
}

impl Index {
    pub async fn build(api: &impl ClusterApi, selector: &str) -> Result<Self, IndexError> {
        let selector = eligible_selector(selector);
        tracing::debug!(selector, "Building index");

        let pods = api
            .list_pods(&selector)
            .await
            .map_err(IndexError::listing("pods"))?;
        let metrics = api
            .list_pod_metrics(&selector)
            .await
            .map_err(IndexError::listing("pod metrics"))?;
        let workloads = api
            .list_deployments(&selector)
            .await
            .map_err(IndexError::listing("deployments"))?;

        Ok(Self::from_listings(pods, metrics, workloads))
    }

    pub fn from_listings(
        pods: impl IntoIterator<Item = corev1::Pod>,
        metrics: impl IntoIterator<Item = metricsv1::PodMetrics>,
        workloads: impl IntoIterator<Item = appsv1::Deployment>,
    ) -> Self {
        let pods = pods
            .into_iter()
            .map(|pod| (ObjectKey::of(&pod.metadata), pod))
            .collect::<HashMap<_, _>>();

        let mut usage = HashMap::new();
        for metrics in metrics {
            let pod_key = ObjectKey::of(&metrics.metadata);
            let Some(pod) = pods.get(&pod_key) else {
                tracing::warn!(
                    namespace = %pod_key.namespace,
                    name = %pod_key.name,
                    "Pod not found for pod metrics, skipping"
                );
                continue;
            };
            let Some(key) = ObjectKey::app(&pod.metadata) else {
                tracing::warn!(
                    namespace = %pod_key.namespace,
                    name = %pod_key.name,
                    "Pod has no {} label, skipping its metrics",
                    labels::APP
                );
                continue;
            };
            if usage.insert(key, metrics).is_some() {
                tracing::debug!(
                    namespace = %pod_key.namespace,
                    name = %pod_key.name,
                    "Replacing metrics of another pod of the same deployment"
                );
            }
        }

        let workloads = workloads.into_iter().collect();

        Self { usage, workloads }
    }

    /// Latest usage of a workload keyed by its `app` label and namespace
    pub fn usage(&self, key: &ObjectKey) -> Option<&metricsv1::PodMetrics> {
        self.usage.get(key)
    }

    /// Eligible deployments in listing order
    pub fn workloads(&self) -> &[appsv1::Deployment] {
        &self.workloads
    }
}
