use std::fmt;
use std::future::Future;

use k8s_idler_ext as k8s;
use kube::api;

use k8s::appsv1;
use k8s::corev1;
use k8s::metricsv1;
use k8s::ObjectKey;

pub use credentials::Credentials;
pub use credentials::CredentialsError;
pub use patch::ScaleToZero;
pub use patch::ServiceRedirect;

mod credentials;
mod patch;

/// Field manager recorded on every patch
pub const FIELD_MANAGER: &str = "k8s-idler";

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl ApiError {
    pub fn not_found<K>(key: &ObjectKey) -> Self
    where
        K: k8s::openapi::Resource,
    {
        let kind = K::KIND;
        let key = key.clone();
        Self::NotFound { kind, key }
    }
}

/// Everything the idler reads from and writes to the cluster.
///
/// Listings span all namespaces and are filtered by a label selector in the
/// usual `key=value,!key` syntax. Writes are JSON merge patches addressed by
/// name and namespace.
pub trait ClusterApi {
    fn list_pods(&self, selector: &str) -> impl Future<Output = Result<Vec<corev1::Pod>>>;

    fn list_pod_metrics(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<metricsv1::PodMetrics>>>;

    fn list_deployments(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<appsv1::Deployment>>>;

    fn get_service(&self, key: &ObjectKey) -> impl Future<Output = Result<corev1::Service>>;

    fn patch_service(
        &self,
        key: &ObjectKey,
        patch: &ServiceRedirect,
    ) -> impl Future<Output = Result<corev1::Service>>;

    fn patch_deployment(
        &self,
        key: &ObjectKey,
        patch: &ScaleToZero,
    ) -> impl Future<Output = Result<appsv1::Deployment>>;
}

pub struct KubeApi {
    patch_params: api::PatchParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi authenticated through the given credentials source.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), k8s_idler_kubeapi::CredentialsError> {
    /// use k8s_idler_kubeapi::{Credentials, KubeApi};
    ///
    /// let api = KubeApi::new(&Credentials::Infer).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(credentials: &Credentials) -> Result<Self, CredentialsError> {
        credentials.client().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        let patch_params = api::PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..api::PatchParams::default()
        };
        Self {
            patch_params,
            client,
        }
    }

    fn list_params(selector: &str) -> api::ListParams {
        api::ListParams::default().labels(selector)
    }

    fn pods(&self) -> api::Api<corev1::Pod> {
        api::Api::all(self.client.clone())
    }

    fn pod_metrics(&self) -> api::Api<metricsv1::PodMetrics> {
        api::Api::all(self.client.clone())
    }

    fn deployments(&self) -> api::Api<appsv1::Deployment> {
        api::Api::all(self.client.clone())
    }

    fn namespaced_deployments(&self, namespace: &str) -> api::Api<appsv1::Deployment> {
        api::Api::namespaced(self.client.clone(), namespace)
    }

    fn namespaced_services(&self, namespace: &str) -> api::Api<corev1::Service> {
        api::Api::namespaced(self.client.clone(), namespace)
    }
}

impl ClusterApi for KubeApi {
    async fn list_pods(&self, selector: &str) -> Result<Vec<corev1::Pod>> {
        let lp = Self::list_params(selector);
        let pods = self.pods().list(&lp).await?;
        tracing::debug!(selector, count = pods.items.len(), "Listed pods");
        Ok(pods.items)
    }

    async fn list_pod_metrics(&self, selector: &str) -> Result<Vec<metricsv1::PodMetrics>> {
        let lp = Self::list_params(selector);
        let metrics = self.pod_metrics().list(&lp).await?;
        tracing::debug!(selector, count = metrics.items.len(), "Listed pod metrics");
        Ok(metrics.items)
    }

    async fn list_deployments(&self, selector: &str) -> Result<Vec<appsv1::Deployment>> {
        let lp = Self::list_params(selector);
        let deployments = self.deployments().list(&lp).await?;
        tracing::debug!(
            selector,
            count = deployments.items.len(),
            "Listed deployments"
        );
        Ok(deployments.items)
    }

    async fn get_service(&self, key: &ObjectKey) -> Result<corev1::Service> {
        self.namespaced_services(&key.namespace)
            .get_opt(&key.name)
            .await?
            .ok_or_else(|| ApiError::not_found::<corev1::Service>(key))
    }

    async fn patch_service(
        &self,
        key: &ObjectKey,
        patch: &ServiceRedirect,
    ) -> Result<corev1::Service> {
        let patch = api::Patch::Merge(patch);
        let service = self
            .namespaced_services(&key.namespace)
            .patch(&key.name, &self.patch_params, &patch)
            .await?;
        Ok(service)
    }

    async fn patch_deployment(
        &self,
        key: &ObjectKey,
        patch: &ScaleToZero,
    ) -> Result<appsv1::Deployment> {
        let patch = api::Patch::Merge(patch);
        let deployment = self
            .namespaced_deployments(&key.namespace)
            .patch(&key.name, &self.patch_params, &patch)
            .await?;
        Ok(deployment)
    }
}

impl fmt::Debug for KubeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeApi")
            .field("patch_params", &self.patch_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
