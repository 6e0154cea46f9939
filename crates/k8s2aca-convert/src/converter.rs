//! Main converter logic
//!
//! Runs the pipeline for a whole manifest stream: load, classify, then
//! for every workload map containers and ingress and assemble one ACA
//! template with its migration report.

use k8s2aca_core::{ManifestSet, Workload, WorkloadKind, load_manifests};

use crate::aca::{AcaProperties, AcaTemplate, DEDICATED_PROFILE, RevisionTemplate};
use crate::container::ContainerMapper;
use crate::error::Result;
use crate::ingress::map_ingress;
use crate::report::MigrationReport;
use crate::resolver::ChoiceResolver;

/// App name used for unnamed workloads
pub const DEFAULT_APP_NAME: &str = "aca-app";

/// Options for the converter
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Write unsupported-resource entries to the first workload's report only
    pub report_unsupported_once: bool,
}

/// One translated workload
#[derive(Debug, Clone)]
pub struct WorkloadConversion {
    pub kind: WorkloadKind,
    pub name: Option<String>,
    pub template: AcaTemplate,
    pub report: MigrationReport,
}

impl WorkloadConversion {
    /// Name used for output artifacts
    pub fn app_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }
}

/// Result of a conversion, one entry per workload in input order
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    pub workloads: Vec<WorkloadConversion>,
}

/// Convert Kubernetes manifests to container app templates
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert a YAML manifest stream
    pub fn convert(
        &self,
        input: &[u8],
        resolver: &mut dyn ChoiceResolver,
    ) -> Result<ConversionResult> {
        let documents = load_manifests(input)?;
        let set = ManifestSet::classify(documents)?;
        self.convert_set(&set, resolver)
    }

    /// Convert already classified resources
    pub fn convert_set(
        &self,
        set: &ManifestSet,
        resolver: &mut dyn ChoiceResolver,
    ) -> Result<ConversionResult> {
        set.ensure_workloads()?;

        let mut result = ConversionResult::default();
        for (index, workload) in set.workloads.iter().enumerate() {
            tracing::debug!(
                kind = %workload.kind,
                name = workload.name().unwrap_or(DEFAULT_APP_NAME),
                "converting workload"
            );
            let include_unsupported = index == 0 || !self.options.report_unsupported_once;
            let conversion = self.convert_workload(workload, set, resolver, include_unsupported)?;
            result.workloads.push(conversion);
        }

        Ok(result)
    }

    fn convert_workload(
        &self,
        workload: &Workload,
        set: &ManifestSet,
        resolver: &mut dyn ChoiceResolver,
        include_unsupported: bool,
    ) -> Result<WorkloadConversion> {
        let mut report = MigrationReport::new();
        let mut containers = Vec::with_capacity(workload.pod_spec.containers.len());
        let mut needs_dedicated = false;

        let mut mapper = ContainerMapper::new(&set.config_maps, &set.secrets, resolver);
        for container in &workload.pod_spec.containers {
            let mapped = mapper.map(container, &workload.pod_spec, &mut report)?;
            needs_dedicated |= mapped.needs_dedicated;
            containers.push(mapped.container);
        }

        let ingress = map_ingress(&set.services, &set.ingresses, &mut report);

        if include_unsupported {
            for resource in &set.unsupported {
                report.unsupported(format!(
                    "{} '{}' is not supported in ACA. Manual migration required.",
                    resource.kind, resource.name
                ));
            }
        }

        let workload_profile_name = if needs_dedicated {
            report.info(format!(
                "'{}' workload profile assigned in ACA template for containers requiring >8GiB memory.",
                DEDICATED_PROFILE
            ));
            Some(DEDICATED_PROFILE.to_string())
        } else {
            None
        };

        let template = AcaTemplate::new(AcaProperties {
            template: RevisionTemplate { containers },
            labels: workload.metadata.labels.clone(),
            annotations: workload.metadata.annotations.clone(),
            ingress,
            workload_profile_name,
        });

        Ok(WorkloadConversion {
            kind: workload.kind,
            name: workload.metadata.name.clone(),
            template,
            report,
        })
    }
}

/// Convert a manifest stream with default options
pub fn convert(input: &[u8], resolver: &mut dyn ChoiceResolver) -> Result<ConversionResult> {
    Converter::new(ConvertOptions::default()).convert(input, resolver)
}

/// Convert with options
pub fn convert_with_options(
    input: &[u8],
    resolver: &mut dyn ChoiceResolver,
    options: ConvertOptions,
) -> Result<ConversionResult> {
    Converter::new(options).convert(input, resolver)
}
