//! Typed pod specification
//!
//! These types mirror the subset of the Kubernetes `PodSpec` the converter
//! translates. Every field is optional or defaulted so that partially
//! specified manifests still decode; the mapper reports what is missing.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::manifest::{lenient_string, null_as_default, scalar_to_string};

/// Resource key for NVIDIA GPUs
pub const GPU_RESOURCE: &str = "nvidia.com/gpu";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub containers: Vec<Container>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub volumes: Vec<Volume>,
}

impl PodSpec {
    /// Find a pod volume by name
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }
}

/// A container entry in a pod spec
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: ResourceRequirements,

    #[serde(default, deserialize_with = "null_as_default")]
    pub env: Vec<EnvVar>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<ContainerPort>,

    #[serde(default)]
    pub liveness_probe: Option<Probe>,

    #[serde(default)]
    pub readiness_probe: Option<Probe>,

    /// `None` when the container declares no `volumeMounts` key at all
    #[serde(default)]
    pub volume_mounts: Option<Vec<VolumeMount>>,
}

impl Container {
    /// Container name for diagnostics
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// Resource limits and requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, deserialize_with = "null_as_default")]
    pub limits: BTreeMap<String, Quantity>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub requests: BTreeMap<String, Quantity>,
}

impl ResourceRequirements {
    /// Look up a resource in limits, falling back to requests
    ///
    /// Returns the quantity and whether it came from limits.
    pub fn get(&self, resource: &str) -> Option<(&Quantity, ResourceSource)> {
        self.limits
            .get(resource)
            .map(|q| (q, ResourceSource::Limit))
            .or_else(|| {
                self.requests
                    .get(resource)
                    .map(|q| (q, ResourceSource::Request))
            })
    }
}

/// Where a resource quantity was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSource {
    Limit,
    Request,
}

impl ResourceSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Request => "request",
        }
    }
}

/// A resource quantity as written in the manifest (`500m`, `2`, `512Mi`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity(pub String);

impl Quantity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(Quantity(String::new())),
            other => scalar_to_string(&other)
                .map(Quantity)
                .ok_or_else(|| de::Error::custom("expected a quantity string or number")),
        }
    }
}

/// Environment variable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,

    #[serde(default)]
    pub value_from: Option<EnvVarSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    #[serde(default)]
    pub config_map_key_ref: Option<KeySelector>,

    #[serde(default)]
    pub secret_key_ref: Option<KeySelector>,

    #[serde(default)]
    pub field_ref: Option<Value>,

    #[serde(default)]
    pub resource_field_ref: Option<Value>,
}

/// `{name, key}` reference into a ConfigMap or Secret
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeySelector {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    #[serde(default)]
    pub container_port: Option<i32>,

    #[serde(default)]
    pub name: Option<String>,
}

/// Numeric or named port
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortRef {
    Number(i32),
    Name(String),
}

impl PortRef {
    /// Numeric value, parsing numeric strings
    pub fn as_number(&self) -> Option<i32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Name(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// Liveness/readiness probe
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(default)]
    pub http_get: Option<HttpGetAction>,

    #[serde(default)]
    pub tcp_socket: Option<TcpSocketAction>,

    #[serde(default)]
    pub exec: Option<Value>,

    #[serde(default)]
    pub grpc: Option<Value>,
}

impl Probe {
    /// Name of the probe mechanism, for diagnostics
    pub fn mechanism(&self) -> &'static str {
        if self.http_get.is_some() {
            "httpGet"
        } else if self.tcp_socket.is_some() {
            "tcpSocket"
        } else if self.exec.is_some() {
            "exec"
        } else if self.grpc.is_some() {
            "grpc"
        } else {
            "unknown"
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpGetAction {
    #[serde(default)]
    pub path: Option<String>,

    pub port: PortRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TcpSocketAction {
    pub port: PortRef,
}

/// Pod volume; the volume source is kept as raw keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Volume {
    pub name: String,

    #[serde(flatten)]
    pub source: BTreeMap<String, Value>,
}

impl Volume {
    pub fn is_azure_file(&self) -> bool {
        self.source.contains_key("azureFile")
    }

    /// Volume source type (`emptyDir`, `persistentVolumeClaim`, ...)
    pub fn source_type(&self) -> &str {
        self.source
            .keys()
            .next()
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,

    #[serde(default)]
    pub mount_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_container() {
        let yaml = r#"
containers:
  - name: app
    image: nginx:1.25
    resources:
      limits:
        cpu: 500m
        nvidia.com/gpu: 1
      requests:
        memory: 512Mi
    env:
      - name: MODE
        value: production
      - name: RETRIES
        value: 3
    ports:
      - containerPort: 8080
        name: http
    livenessProbe:
      httpGet:
        path: /healthz
        port: http
    volumeMounts:
      - name: data
        mountPath: /data
volumes:
  - name: data
    emptyDir: {}
"#;
        let spec: PodSpec = serde_yaml::from_str(yaml).unwrap();
        let container = &spec.containers[0];

        assert_eq!(container.display_name(), "app");
        let (cpu, source) = container.resources.get("cpu").unwrap();
        assert_eq!(cpu.as_str(), "500m");
        assert_eq!(source, ResourceSource::Limit);
        let (memory, source) = container.resources.get("memory").unwrap();
        assert_eq!(memory.as_str(), "512Mi");
        assert_eq!(source, ResourceSource::Request);
        assert_eq!(container.resources.limits[GPU_RESOURCE].as_str(), "1");

        assert_eq!(container.env[1].value.as_deref(), Some("3"));
        assert_eq!(container.ports[0].container_port, Some(8080));

        let probe = container.liveness_probe.as_ref().unwrap();
        assert_eq!(probe.mechanism(), "httpGet");
        assert_eq!(
            probe.http_get.as_ref().unwrap().port,
            PortRef::Name("http".to_string())
        );

        let volume = spec.volume("data").unwrap();
        assert!(!volume.is_azure_file());
        assert_eq!(volume.source_type(), "emptyDir");
    }

    #[test]
    fn test_null_sections_default() {
        let spec: PodSpec =
            serde_yaml::from_str("containers:\n  - name: a\n    env:\n    resources:\n").unwrap();
        assert!(spec.containers[0].env.is_empty());
        assert!(spec.containers[0].resources.limits.is_empty());
        assert!(spec.containers[0].volume_mounts.is_none());
        assert!(spec.volumes.is_empty());
    }

    #[test]
    fn test_port_ref_numeric_string() {
        assert_eq!(PortRef::Name("8080".into()).as_number(), Some(8080));
        assert_eq!(PortRef::Name("http".into()).as_number(), None);
        assert_eq!(PortRef::Number(80).to_string(), "80");
    }
}
