use k8s_openapi::apimachinery::pkg::api::resource;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use serde::Deserialize;
use serde::Serialize;

pub use quantity::QuantityExt;
pub use quantity::QuantityParseError;

pub mod v1beta1;

mod quantity;
