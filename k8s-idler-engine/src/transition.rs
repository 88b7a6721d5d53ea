use k8s::DeploymentExt as _;

use super::*;

/// Moves a deployment into the idle state.
///
/// The Service is redirected to the unidler first, then the Deployment is
/// scaled to zero and marked. The two writes are not atomic: if the second
/// one fails the Deployment stays eligible and is retried on the next run,
/// which is safe because the redirect is idempotent.
#[derive(Debug)]
pub struct Transition<'a, A> {
    api: &'a A,
    redirect: &'a ServiceRedirect,
}

impl<'a, A> Transition<'a, A>
where
    A: ClusterApi,
{
    pub fn new(api: &'a A, redirect: &'a ServiceRedirect) -> Self {
        Self { api, redirect }
    }

    pub async fn idle(
        &self,
        workload: &appsv1::Deployment,
        now: OffsetDateTime,
    ) -> Result<(), IdleError> {
        let key = ObjectKey::of(&workload.metadata);

        self.redirect_service(&key)
            .await
            .map_err(IdleError::Redirect)?;

        // Captured before the patch, which itself sets replicas to 0
        let replicas = workload.replicas();
        let patch = ScaleToZero::new(replicas, now)?;
        self.api
            .patch_deployment(&key, &patch)
            .await
            .map_err(IdleError::Scale)?;

        tracing::info!(
            namespace = %key.namespace,
            name = %key.name,
            replicas,
            idled_at = patch.idled_at(),
            "Idled"
        );
        Ok(())
    }

    /// Write the redirect to the Service named after the deployment.
    ///
    /// The Service is read first so that a missing one is reported as such.
    /// The patch is sent even when the redirect is already in place.
    async fn redirect_service(&self, key: &ObjectKey) -> k8s_idler_kubeapi::Result<corev1::Service> {
        let service = self.api.get_service(key).await?;
        if self.redirect.is_applied(&service) {
            tracing::debug!(
                namespace = %key.namespace,
                name = %key.name,
                "Service already points at the unidler"
            );
        }
        self.api.patch_service(key, self.redirect).await
    }
}
