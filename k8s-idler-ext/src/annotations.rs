//! Annotations written on an idled Deployment.

use constcat::concat;

use super::labels::DOMAIN;

/// RFC 3339 UTC time, second precision, at which the Deployment was idled.
pub const IDLED_AT: &str = concat!(DOMAIN, "/idled-at");

/// Replica count the Deployment had right before it was idled.
pub const REPLICAS_WHEN_UNIDLED: &str = concat!(DOMAIN, "/replicas-when-unidled");
