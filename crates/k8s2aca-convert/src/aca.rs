//! Azure Container Apps template model
//!
//! Output side of the converter. Field order here is the order in the
//! serialized YAML.

use k8s2aca_core::PortRef;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// ARM resource type of a container app
pub const ACA_RESOURCE_TYPE: &str = "Microsoft.App/containerApps";

/// Workload profile required above the consumption memory ceiling
pub const DEDICATED_PROFILE: &str = "Dedicated";

/// A container app template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcaTemplate {
    #[serde(rename = "type")]
    pub resource_type: String,

    pub properties: AcaProperties,
}

impl AcaTemplate {
    pub fn new(properties: AcaProperties) -> Self {
        Self {
            resource_type: ACA_RESOURCE_TYPE.to_string(),
            properties,
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaProperties {
    pub template: RevisionTemplate,

    pub labels: BTreeMap<String, String>,

    pub annotations: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<AcaIngress>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_profile_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionTemplate {
    pub containers: Vec<AcaContainer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub resources: AcaResources,

    pub env: Vec<AcaEnvVar>,

    pub ports: Vec<AcaPort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<AcaProbes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<AcaVolumeMount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaResources {
    /// CPU cores
    pub cpu: f64,

    /// Memory as `<N>.<D>Gi`
    pub memory: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpus: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_sku: Option<GpuSku>,
}

/// GPU SKUs available to container apps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GpuSku {
    A100,
    T4,
}

impl GpuSku {
    pub const ALL: [GpuSku; 2] = [GpuSku::A100, GpuSku::T4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A100 => "A100",
            Self::T4 => "T4",
        }
    }

    pub fn from_option(option: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sku| sku.as_str() == option)
    }
}

impl fmt::Display for GpuSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcaEnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcaPort {
    pub port: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaProbes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<AcaProbe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<AcaProbe>,
}

impl AcaProbes {
    pub fn is_empty(&self) -> bool {
        self.liveness_probe.is_none() && self.readiness_probe.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcaProbe {
    #[serde(rename = "type")]
    pub probe_type: ProbeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub port: PortRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeType {
    Http,
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaVolumeMount {
    pub name: String,
    pub storage_type: StorageType,
    pub mount_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageType {
    AzureFile,
    AzureBlob,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureFile => "AzureFile",
            Self::AzureBlob => "AzureBlob",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaIngress {
    pub external: bool,

    pub target_port: i32,

    pub transport: Transport,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domains: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Auto,
}
