use std::fmt;

use super::*;

/// Composite `(name, namespace)` identity of a namespaced object.
///
/// Also used to key workloads by their `app` label instead of the object name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub name: String,
    pub namespace: String,
}

impl ObjectKey {
    pub fn new(name: impl ToString, namespace: impl ToString) -> Self {
        let name = name.to_string();
        let namespace = namespace.to_string();
        Self { name, namespace }
    }

    /// Key an object by its own name
    pub fn of(metadata: &metav1::ObjectMeta) -> Self {
        let name = metadata.name.clone().unwrap_or_default();
        let namespace = metadata.namespace.clone().unwrap_or_default();
        Self { name, namespace }
    }

    /// Key an object by the workload it belongs to, taken from its `app` label
    pub fn app(metadata: &metav1::ObjectMeta) -> Option<Self> {
        let name = metadata.label_value(labels::APP)?.to_string();
        let namespace = metadata.namespace.clone().unwrap_or_default();
        Some(Self { name, namespace })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
