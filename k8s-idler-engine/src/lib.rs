use std::collections::HashMap;

use k8s_idler_ext as k8s;
use k8s_idler_kubeapi::ApiError;
use k8s_idler_kubeapi::ClusterApi;
use k8s_idler_kubeapi::ScaleToZero;
use k8s_idler_kubeapi::ServiceRedirect;
use time::OffsetDateTime;

use k8s::appsv1;
use k8s::corev1;
use k8s::labels;
use k8s::metricsv1;
use k8s::ObjectKey;

pub use error::EvaluateError;
pub use error::IdleError;
pub use error::IndexError;
pub use evaluate::should_idle;
pub use evaluate::utilization;
pub use idler::Failure;
pub use idler::DEFAULT_CPU_ACTIVITY_THRESHOLD;
pub use idler::DEFAULT_UNIDLER_SERVICE_HOST;
pub use idler::Idler;
pub use idler::IdlerConfig;
pub use idler::Report;
pub use index::eligible_selector;
pub use index::Index;
pub use transition::Transition;

mod error;
mod evaluate;
mod idler;
mod index;
mod transition;

#[cfg(test)]
mod fake;
