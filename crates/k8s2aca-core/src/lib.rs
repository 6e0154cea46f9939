//! k8s2aca Core - Kubernetes manifest loading and classification
//!
//! This crate provides the input side of the converter:
//! - `load_manifests`: multi-document YAML stream → `ManifestDocument`s
//! - `ManifestSet`: documents bucketed into workloads, lookup tables,
//!   Services, Ingresses and unsupported resources
//! - `PodSpec`: the typed container model read by the mappers

pub mod classify;
pub mod error;
pub mod manifest;
pub mod pod;

pub use classify::{
    Ingress, KeyValueTable, ManifestSet, ManifestSummary, RECOGNIZED_KINDS, Service, ServicePort,
    UnsupportedResource, Workload, WorkloadKind,
};
pub use error::{CoreError, Result};
pub use manifest::{ManifestDocument, ObjectMeta, load_manifest_file, load_manifests};
pub use pod::{
    Container, EnvVar, GPU_RESOURCE, PodSpec, PortRef, Probe, Quantity, ResourceSource, Volume,
    VolumeMount,
};
