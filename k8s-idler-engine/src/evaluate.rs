use k8s::ContainerExt as _;
use k8s::DeploymentExt as _;
use k8s::QuantityExt as _;

use super::*;

/// Aggregate CPU utilization of a deployment in percent of its CPU limit.
///
/// Usage comes from the latest pod metrics of the deployment, limits from its
/// pod template. Missing metrics and usage or limits in an unknown unit count
/// as 0% so that they never prevent idling.
pub fn utilization(workload: &appsv1::Deployment, index: &Index) -> Result<f64, EvaluateError> {
    let key = workload_key(workload)?;

    let Some(metrics) = index.usage(&key) else {
        tracing::warn!(
            namespace = %key.namespace,
            name = %key.name,
            "Metrics not found, pod may be unhealthy"
        );
        return Ok(0.0);
    };

    match percent_of_limit(workload, metrics) {
        Err(EvaluateError::Quantity(err)) => {
            tracing::warn!(
                namespace = %key.namespace,
                name = %key.name,
                error = %err,
                "Using unknown unit of CPU"
            );
            Ok(0.0)
        }
        other => other,
    }
}

/// Whether the deployment is idle, i.e. at or below `threshold` percent
pub fn should_idle(
    workload: &appsv1::Deployment,
    index: &Index,
    threshold: i32,
) -> Result<bool, EvaluateError> {
    let key = ObjectKey::of(&workload.metadata);
    let usage = utilization(workload, index)?;
    tracing::debug!(namespace = %key.namespace, name = %key.name, usage, "Using {usage}% of CPU");

    if usage > f64::from(threshold) {
        tracing::info!(
            namespace = %key.namespace,
            name = %key.name,
            usage,
            threshold,
            "Not idling as using {usage}% of CPU"
        );
        Ok(false)
    } else {
        Ok(true)
    }
}

fn workload_key(workload: &appsv1::Deployment) -> Result<ObjectKey, EvaluateError> {
    ObjectKey::app(&workload.metadata).ok_or(EvaluateError::MissingAppLabel { label: labels::APP })
}

fn percent_of_limit(
    workload: &appsv1::Deployment,
    metrics: &metricsv1::PodMetrics,
) -> Result<f64, EvaluateError> {
    let usage = metrics.cpu()?;
    let limit = cpu_limit(workload)?;
    cpu_percent(usage, limit)
}

/// Sum of the CPU limits of all containers in the pod template
fn cpu_limit(workload: &appsv1::Deployment) -> Result<f64, EvaluateError> {
    let mut total = 0.0;
    for container in workload.containers() {
        let limit = container
            .cpu_limit()
            .ok_or_else(|| EvaluateError::MissingCpuLimit {
                container: container.name.clone(),
            })?;
        total += limit.to_millicores()?;
    }
    Ok(total)
}

fn cpu_percent(usage: f64, limit: f64) -> Result<f64, EvaluateError> {
    if limit > 0.0 {
        Ok(100.0 * usage / limit)
    } else {
        Err(EvaluateError::ZeroCpuLimit)
    }
}
