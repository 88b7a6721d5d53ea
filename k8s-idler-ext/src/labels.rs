//! Labels read or written by the idler.

use constcat::concat;

/// Domain prefix shared with the unidler.
pub const DOMAIN: &str = "mojanalytics.xyz";

/// Label carrying the workload name on both the Deployment and its pods.
pub const APP: &str = "app";

/// Marker label of an idled Deployment, its presence excludes the
/// Deployment from being selected again.
pub const IDLED: &str = concat!(DOMAIN, "/idled");

/// Opt-in label selected by default.
pub const IDLEABLE: &str = concat!(DOMAIN, "/idleable");
