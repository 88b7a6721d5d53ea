//! Typed JSON merge patches.
//!
//! Each patch serializes to the partial document sent to the API server and
//! can also be applied to an object in memory with the same result.

use std::collections::BTreeMap;

use k8s_idler_ext as k8s;

use k8s::annotations;
use k8s::labels;
use k8s::openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use serde::Serializer;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::*;

const EXTERNAL_NAME: &str = "ExternalName";
const HTTP_PORT_NAME: &str = "http";
const HTTP_PORT: i32 = 80;
const TCP: &str = "TCP";

/// Serializes as `null`, which removes the field under a merge patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Remove;

impl Serialize for Remove {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

/// Turns a Service into an `ExternalName` alias of the unidler.
///
/// Re-applying it to an already redirected Service changes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRedirect {
    external_name: String,
}

#[derive(Serialize)]
struct ServicePatch<'a> {
    spec: ServiceSpecPatch<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceSpecPatch<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    external_name: &'a str,
    ports: [corev1::ServicePort; 1],
    selector: Remove,
    #[serde(rename = "clusterIP")]
    cluster_ip: Remove,
    #[serde(rename = "clusterIPs")]
    cluster_ips: Remove,
}

impl ServiceRedirect {
    pub fn to(external_name: impl ToString) -> Self {
        let external_name = external_name.to_string();
        Self { external_name }
    }

    fn http_port() -> corev1::ServicePort {
        corev1::ServicePort {
            name: Some(HTTP_PORT_NAME.to_string()),
            port: HTTP_PORT,
            protocol: Some(TCP.to_string()),
            target_port: Some(IntOrString::Int(HTTP_PORT)),
            ..k8s::default()
        }
    }

    /// Apply the redirect to an in-memory Service
    pub fn apply(&self, service: &mut corev1::Service) {
        let spec = service.spec.get_or_insert_with(k8s::default);
        spec.type_ = Some(EXTERNAL_NAME.to_string());
        spec.external_name = Some(self.external_name.clone());
        spec.ports = Some(vec![Self::http_port()]);
        spec.selector = None;
        spec.cluster_ip = None;
        spec.cluster_ips = None;
    }

    /// Whether `service` already points at the unidler
    pub fn is_applied(&self, service: &corev1::Service) -> bool {
        service.spec.as_ref().is_some_and(|spec| {
            spec.type_.as_deref() == Some(EXTERNAL_NAME)
                && spec.external_name.as_deref() == Some(self.external_name.as_str())
        })
    }
}

impl Serialize for ServiceRedirect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let spec = ServiceSpecPatch {
            type_: EXTERNAL_NAME,
            external_name: &self.external_name,
            ports: [Self::http_port()],
            selector: Remove,
            cluster_ip: Remove,
            cluster_ips: Remove,
        };
        ServicePatch { spec }.serialize(serializer)
    }
}

/// Scales a Deployment to zero and leaves what the unidler needs to restore it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleToZero {
    idled_at: String,
    replicas_when_unidled: i32,
}

#[derive(Serialize)]
struct DeploymentPatch<'a> {
    metadata: MetadataPatch<'a>,
    spec: DeploymentSpecPatch,
}

#[derive(Serialize)]
struct MetadataPatch<'a> {
    labels: BTreeMap<&'static str, &'a str>,
    annotations: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
struct DeploymentSpecPatch {
    replicas: i32,
}

impl ScaleToZero {
    /// `replicas` is the count before idling, `idled_at` is truncated to seconds.
    pub fn new(replicas: i32, idled_at: OffsetDateTime) -> Result<Self, time::error::Format> {
        let idled_at = idled_at
            .to_offset(time::UtcOffset::UTC)
            .replace_nanosecond(0)
            .unwrap_or(idled_at)
            .format(&Rfc3339)?;
        Ok(Self {
            idled_at,
            replicas_when_unidled: replicas,
        })
    }

    pub fn idled_at(&self) -> &str {
        &self.idled_at
    }

    pub fn replicas_when_unidled(&self) -> i32 {
        self.replicas_when_unidled
    }

    fn labels(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([(labels::IDLED, "true")])
    }

    fn annotations(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (annotations::IDLED_AT, self.idled_at.clone()),
            (
                annotations::REPLICAS_WHEN_UNIDLED,
                self.replicas_when_unidled.to_string(),
            ),
        ])
    }

    /// Apply the patch to an in-memory Deployment
    pub fn apply(&self, deployment: &mut appsv1::Deployment) {
        let metadata = &mut deployment.metadata;
        let labels = metadata.labels.get_or_insert_with(k8s::default);
        for (key, value) in self.labels() {
            labels.insert(key.to_string(), value.to_string());
        }
        let annotations = metadata.annotations.get_or_insert_with(k8s::default);
        for (key, value) in self.annotations() {
            annotations.insert(key.to_string(), value);
        }
        deployment.spec.get_or_insert_with(k8s::default).replicas = Some(0);
    }
}

impl Serialize for ScaleToZero {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let metadata = MetadataPatch {
            labels: self.labels(),
            annotations: self.annotations(),
        };
        let spec = DeploymentSpecPatch { replicas: 0 };
        DeploymentPatch { metadata, spec }.serialize(serializer)
    }
}
