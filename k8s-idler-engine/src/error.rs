use k8s::QuantityParseError;

use super::*;

/// A workload's utilization cannot be computed at all.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error("deployment has no {label:?} label")]
    MissingAppLabel { label: &'static str },

    #[error("container {container:?} has no CPU limit")]
    MissingCpuLimit { container: String },

    #[error("total CPU limit is zero")]
    ZeroCpuLimit,

    #[error(transparent)]
    Quantity(#[from] QuantityParseError),
}

/// Failure of a single workload, isolated from the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum IdleError {
    #[error("failed to evaluate CPU utilization: {0}")]
    Evaluate(#[from] EvaluateError),

    #[error("failed to redirect service to the unidler: {0}")]
    Redirect(#[source] ApiError),

    #[error("failed to scale deployment to zero: {0}")]
    Scale(#[source] ApiError),

    #[error("failed to format idled-at timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// The index cannot be built, nothing can be evaluated.
#[derive(Debug, thiserror::Error)]
#[error("failed to list {kind}: {source}")]
pub struct IndexError {
    kind: &'static str,
    #[source]
    source: ApiError,
}

impl IndexError {
    pub(crate) fn listing(kind: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| Self { kind, source }
    }
}
