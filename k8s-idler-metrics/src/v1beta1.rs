use std::time::Duration;

use constcat::concat;

use super::*;

pub use pod::PodMetrics;

pub const METRICS_API_GROUP: &str = "metrics.k8s.io";
pub const METRICS_API_VERSION: &str = "v1beta1";
pub const METRICS_API_GROUP_VERSION: &str = concat!(METRICS_API_GROUP, "/", METRICS_API_VERSION);

mod duration;
mod pod;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub cpu: resource::Quantity,
    #[serde(default)]
    pub memory: resource::Quantity,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub usage: Usage,
}

impl Usage {
    /// CPU usage in millicores, see [`QuantityExt::to_millicores`]
    pub fn cpu(&self) -> Result<f64, QuantityParseError> {
        self.cpu.to_millicores()
    }
}

impl Container {
    pub fn new(name: impl ToString, cpu: impl ToString) -> Self {
        let name = name.to_string();
        let usage = Usage {
            cpu: resource::Quantity(cpu.to_string()),
            ..Usage::default()
        };
        Self { name, usage }
    }

    pub fn cpu(&self) -> Result<f64, QuantityParseError> {
        self.usage.cpu()
    }
}

#[cfg(test)]
mod tests;
