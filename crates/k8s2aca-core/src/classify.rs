//! Resource classification
//!
//! Buckets loaded documents by `kind` into workloads, ConfigMap/Secret
//! lookup tables, Services, Ingresses and an unsupported remainder.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::manifest::{ManifestDocument, ObjectMeta, decode_section, null_as_default, value_to_string_map};
use crate::pod::{PodSpec, PortRef};

/// Kinds the converter understands
pub const RECOGNIZED_KINDS: &[&str] = &[
    "Deployment",
    "ReplicaSet",
    "Pod",
    "ConfigMap",
    "Secret",
    "Service",
    "Ingress",
];

/// Workload resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    ReplicaSet,
    Pod,
}

impl WorkloadKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Deployment" => Some(Self::Deployment),
            "ReplicaSet" => Some(Self::ReplicaSet),
            "Pod" => Some(Self::Pod),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::ReplicaSet => "ReplicaSet",
            Self::Pod => "Pod",
        }
    }

    /// Extract the raw pod spec section from a workload's `spec`
    fn pod_spec_section<'a>(&self, spec: &'a Value) -> Option<&'a Value> {
        match self {
            Self::Deployment | Self::ReplicaSet => spec.get("template").and_then(|t| t.get("spec")),
            Self::Pod => Some(spec),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Deployment, ReplicaSet or Pod with its decoded pod spec
#[derive(Debug, Clone)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub metadata: ObjectMeta,
    pub pod_spec: PodSpec,
}

impl Workload {
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }
}

/// Name → key → value lookup built from ConfigMaps or Secrets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl KeyValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named resource
    pub fn insert(&mut self, name: impl Into<String>, data: BTreeMap<String, String>) {
        self.entries.insert(name.into(), data);
    }

    /// Resolve `key` in resource `name`
    pub fn lookup(&self, name: &str, key: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|data| data.get(key))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A classified Service
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSpec {
    #[serde(default, rename = "type")]
    pub service_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    #[serde(default)]
    pub port: Option<i32>,

    #[serde(default)]
    pub target_port: Option<PortRef>,
}

/// A classified Ingress
#[derive(Debug, Clone)]
pub struct Ingress {
    pub name: String,
    pub spec: IngressSpec,
}

impl Ingress {
    /// Hosts declared on the ingress rules, in order
    pub fn hosts(&self) -> Vec<String> {
        self.spec
            .rules
            .iter()
            .filter_map(|rule| rule.host.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngressSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<IngressRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngressRule {
    #[serde(default)]
    pub host: Option<String>,
}

/// A document of a kind the converter cannot translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedResource {
    pub kind: String,
    pub name: String,
}

/// All classified resources of one manifest stream
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    /// Number of non-empty documents that were classified
    pub document_count: usize,
    pub workloads: Vec<Workload>,
    pub config_maps: KeyValueTable,
    pub secrets: KeyValueTable,
    pub services: Vec<Service>,
    pub ingresses: Vec<Ingress>,
    pub unsupported: Vec<UnsupportedResource>,
}

impl ManifestSet {
    /// Classify loaded documents
    pub fn classify(documents: Vec<ManifestDocument>) -> Result<Self> {
        let mut set = ManifestSet {
            document_count: documents.len(),
            ..Default::default()
        };

        for doc in documents {
            let kind = doc.kind.clone().unwrap_or_default();

            if let Some(workload_kind) = WorkloadKind::from_kind(&kind) {
                let pod_spec = decode_section(workload_kind.pod_spec_section(&doc.spec))
                    .map_err(|source| invalid(&doc, source))?;
                tracing::debug!(
                    kind = workload_kind.as_str(),
                    name = doc.name_or_unnamed(),
                    "classified workload"
                );
                set.workloads.push(Workload {
                    kind: workload_kind,
                    metadata: doc.metadata,
                    pod_spec,
                });
                continue;
            }

            match kind.as_str() {
                "ConfigMap" => {
                    let Some(name) = doc.metadata.name.clone() else {
                        tracing::debug!("ignoring ConfigMap without a name");
                        continue;
                    };
                    let data = value_to_string_map(&doc.data)
                        .map_err(|message| invalid(&doc, de_error(message)))?;
                    set.config_maps.insert(name, data);
                }
                "Secret" => {
                    let Some(name) = doc.metadata.name.clone() else {
                        tracing::debug!("ignoring Secret without a name");
                        continue;
                    };
                    let data = secret_data(&name, &doc)?;
                    set.secrets.insert(name, data);
                }
                "Service" => {
                    let spec = decode_section(Some(&doc.spec)).map_err(|source| invalid(&doc, source))?;
                    set.services.push(Service {
                        name: doc.name_or_unnamed().to_string(),
                        spec,
                    });
                }
                "Ingress" => {
                    let spec = decode_section(Some(&doc.spec)).map_err(|source| invalid(&doc, source))?;
                    set.ingresses.push(Ingress {
                        name: doc.name_or_unnamed().to_string(),
                        spec,
                    });
                }
                _ => set.unsupported.push(UnsupportedResource {
                    kind: doc.kind_or_unknown().to_string(),
                    name: doc.name_or_unnamed().to_string(),
                }),
            }
        }

        Ok(set)
    }

    /// Fail with [`CoreError::NoWorkload`] when there is nothing to translate
    pub fn ensure_workloads(&self) -> Result<()> {
        if self.workloads.is_empty() {
            return Err(CoreError::NoWorkload);
        }
        Ok(())
    }

    /// Counts per bucket
    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary {
            documents: self.document_count,
            workloads: self.workloads.len(),
            config_maps: self.config_maps.len(),
            secrets: self.secrets.len(),
            services: self.services.len(),
            ingresses: self.ingresses.len(),
            unsupported: self.unsupported.len(),
        }
    }
}

/// Per-bucket document counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub documents: usize,
    pub workloads: usize,
    pub config_maps: usize,
    pub secrets: usize,
    pub services: usize,
    pub ingresses: usize,
    pub unsupported: usize,
}

impl ManifestSummary {
    /// Number of documents with a recognized kind
    pub fn recognized(&self) -> usize {
        self.documents - self.unsupported
    }
}

/// Merge decoded `data` with plain `stringData`; `stringData` wins
fn secret_data(name: &str, doc: &ManifestDocument) -> Result<BTreeMap<String, String>> {
    let encoded = value_to_string_map(&doc.data).map_err(|message| invalid(doc, de_error(message)))?;
    let plain =
        value_to_string_map(&doc.string_data).map_err(|message| invalid(doc, de_error(message)))?;

    let mut data: BTreeMap<String, String> = encoded
        .into_iter()
        .map(|(key, raw)| {
            let value = decode_base64(&raw).unwrap_or_else(|| {
                tracing::warn!(secret = name, key = key.as_str(), "secret value is not base64 text, keeping it as-is");
                raw
            });
            (key, value)
        })
        .collect();
    data.extend(plain);
    Ok(data)
}

fn decode_base64(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

fn invalid(doc: &ManifestDocument, source: serde_yaml::Error) -> CoreError {
    CoreError::InvalidResource {
        kind: doc.kind_or_unknown().to_string(),
        name: doc.name_or_unnamed().to_string(),
        source,
    }
}

fn de_error(message: String) -> serde_yaml::Error {
    <serde_yaml::Error as serde::de::Error>::custom(message)
}
