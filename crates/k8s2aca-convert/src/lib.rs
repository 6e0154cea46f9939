//! k8s2aca Convert - Kubernetes workloads to Azure Container Apps
//!
//! Translates every Deployment, ReplicaSet and Pod of a manifest stream
//! into an ACA template and a migration report listing each default,
//! approximation and unsupported construct met on the way.
//!
//! Choices without a single right answer (GPU SKU, volume handling) are
//! delegated to a [`ChoiceResolver`] supplied by the caller.
//!
//! # Example
//!
//! ```no_run
//! use k8s2aca_convert::{PreferenceResolver, convert};
//!
//! let manifest = std::fs::read("app.yaml").unwrap();
//! let mut resolver = PreferenceResolver::new(["T4", "Map as AzureFile"]);
//! let result = convert(&manifest, &mut resolver).unwrap();
//!
//! for workload in &result.workloads {
//!     println!("{}", workload.template.to_yaml().unwrap());
//!     print!("{}", workload.report);
//! }
//! ```

pub mod aca;
pub mod container;
pub mod converter;
pub mod error;
pub mod ingress;
pub mod report;
pub mod resolver;
pub mod resources;

pub use aca::{AcaContainer, AcaIngress, AcaTemplate, GpuSku, StorageType};
pub use converter::{
    ConversionResult, ConvertOptions, Converter, DEFAULT_APP_NAME, WorkloadConversion, convert,
    convert_with_options,
};
pub use error::{ConvertError, Result};
pub use report::{MigrationReport, ReportEntry, Severity};
pub use resolver::{
    ChoiceResolver, GPU_SKIP, PreferenceResolver, ScriptedResolver, VOLUME_AZURE_BLOB,
    VOLUME_AZURE_FILE, VOLUME_SKIP,
};
