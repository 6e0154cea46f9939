//! Container mapping
//!
//! Translates one Kubernetes container into an ACA container. Problems
//! never abort the mapping: each one degrades a single field and adds one
//! report entry, so the output always has one container per input
//! container.

use k8s2aca_core::pod::{EnvVar, Probe};
use k8s2aca_core::{Container, GPU_RESOURCE, KeyValueTable, PodSpec, VolumeMount};

use crate::aca::{
    AcaContainer, AcaEnvVar, AcaPort, AcaProbe, AcaProbes, AcaResources, AcaVolumeMount, GpuSku,
    ProbeType, StorageType,
};
use crate::error::Result;
use crate::report::MigrationReport;
use crate::resolver::{
    ChoiceResolver, GPU_SKIP, VOLUME_AZURE_BLOB, VOLUME_AZURE_FILE, VOLUME_SKIP, choose,
};
use crate::resources::{
    DEDICATED_MEMORY_THRESHOLD_GI, DEFAULT_CPU, DEFAULT_MEMORY_GI, MAX_GPUS_PER_CONTAINER,
    MemoryIssue, format_memory_gi, parse_cpu, parse_memory_gi,
};

/// A translated container plus what the template needs to know about it
#[derive(Debug, Clone)]
pub struct MappedContainer {
    pub container: AcaContainer,
    /// Memory crossed the consumption ceiling
    pub needs_dedicated: bool,
}

/// Maps containers of one workload
pub struct ContainerMapper<'a> {
    config_maps: &'a KeyValueTable,
    secrets: &'a KeyValueTable,
    resolver: &'a mut dyn ChoiceResolver,
}

impl<'a> ContainerMapper<'a> {
    pub fn new(
        config_maps: &'a KeyValueTable,
        secrets: &'a KeyValueTable,
        resolver: &'a mut dyn ChoiceResolver,
    ) -> Self {
        Self {
            config_maps,
            secrets,
            resolver,
        }
    }

    /// Map a container of `pod`
    ///
    /// Only a resolver failure is an error.
    pub fn map(
        &mut self,
        container: &Container,
        pod: &PodSpec,
        report: &mut MigrationReport,
    ) -> Result<MappedContainer> {
        let name = container.display_name();

        if container.image.as_deref().is_none_or(str::is_empty) {
            report.error(format!(
                "Container {} has no image. ACA requires an image for every container.",
                name
            ));
        }

        let cpu = map_cpu(container, report);
        let memory_gi = map_memory(container, report);
        let needs_dedicated = memory_gi > DEDICATED_MEMORY_THRESHOLD_GI;
        if needs_dedicated {
            report.info(format!(
                "Container '{}' requests >8Gi memory. Will assign Dedicated Workload Profile in ACA.",
                name
            ));
        }

        let mut resources = AcaResources {
            cpu,
            memory: format_memory_gi(memory_gi),
            gpus: None,
            gpu_sku: None,
        };
        if let Some((count, sku)) = self.map_gpu(container, report)? {
            resources.gpus = Some(count);
            resources.gpu_sku = Some(sku);
        }

        let env = self.map_env(container, report);
        let ports = map_ports(container);
        let probes = map_probes(container, report);

        let volume_mounts = match &container.volume_mounts {
            Some(mounts) => Some(self.map_volumes(container, mounts, pod, report)?),
            None => None,
        };

        Ok(MappedContainer {
            container: AcaContainer {
                name: container.name.clone(),
                image: container.image.clone(),
                resources,
                env,
                ports,
                probes,
                volume_mounts,
            },
            needs_dedicated,
        })
    }

    /// Returns the GPU count and SKU, or `None` when no GPU is attached
    fn map_gpu(
        &mut self,
        container: &Container,
        report: &mut MigrationReport,
    ) -> Result<Option<(u32, GpuSku)>> {
        let name = container.display_name();
        let Some(quantity) = container.resources.limits.get(GPU_RESOURCE) else {
            return Ok(None);
        };

        let count = match quantity.as_str().trim().parse::<u32>() {
            Ok(0) => return Ok(None),
            Ok(count) => count,
            Err(_) => {
                report.warning(format!(
                    "Could not parse GPU count '{}' for container {}. GPU mapping skipped.",
                    quantity, name
                ));
                return Ok(None);
            }
        };

        report.info(format!(
            "GPU resource detected for container {}: {} x {}.",
            name, count, GPU_RESOURCE
        ));
        if count > MAX_GPUS_PER_CONTAINER {
            report.warning(format!(
                "Container {} requests {} GPUs; ACA supports up to {} per container.",
                name, count, MAX_GPUS_PER_CONTAINER
            ));
        }

        let prompt = format!(
            "Choose a supported GPU SKU for container '{}' ({} x {}):",
            name, count, GPU_RESOURCE
        );
        let mut options: Vec<&str> = GpuSku::ALL.iter().map(GpuSku::as_str).collect();
        options.push(GPU_SKIP);

        let answer = choose(&mut *self.resolver, &prompt, &options)?;
        match GpuSku::from_option(&answer) {
            Some(sku) => Ok(Some((count, sku))),
            None => {
                report.warning(format!(
                    "GPU mapping skipped for container {}. Will run on CPU only.",
                    name
                ));
                Ok(None)
            }
        }
    }

    fn map_env(&self, container: &Container, report: &mut MigrationReport) -> Vec<AcaEnvVar> {
        container
            .env
            .iter()
            .filter_map(|var| self.resolve_env(var, report))
            .collect()
    }

    /// Resolve one variable to a literal; `None` drops it
    fn resolve_env(&self, var: &EnvVar, report: &mut MigrationReport) -> Option<AcaEnvVar> {
        let literal = |value: &str| AcaEnvVar {
            name: var.name.clone(),
            value: value.to_string(),
        };

        if let Some(value) = &var.value {
            return Some(literal(value));
        }

        let Some(source) = &var.value_from else {
            report.warning(format!(
                "Environment variable {} has no value. Variable omitted.",
                var.name
            ));
            return None;
        };

        if let Some(selector) = &source.config_map_key_ref {
            return match self.config_maps.lookup(&selector.name, &selector.key) {
                Some(value) => Some(literal(value)),
                None => {
                    report.warning(format!(
                        "ConfigMap {} or key {} not found for environment variable {}. Consider using Azure App Configuration.",
                        selector.name, selector.key, var.name
                    ));
                    None
                }
            };
        }

        if let Some(selector) = &source.secret_key_ref {
            return match self.secrets.lookup(&selector.name, &selector.key) {
                Some(value) => {
                    report.info(format!(
                        "Secret {} key {} inlined as a plain value for environment variable {}. Consider ACA secrets or Azure Key Vault.",
                        selector.name, selector.key, var.name
                    ));
                    Some(literal(value))
                }
                None => {
                    report.warning(format!(
                        "Secret {} or key {} not found for environment variable {}. Consider using Azure Key Vault.",
                        selector.name, selector.key, var.name
                    ));
                    None
                }
            };
        }

        let kind = if source.field_ref.is_some() {
            "fieldRef"
        } else if source.resource_field_ref.is_some() {
            "resourceFieldRef"
        } else {
            report.warning(format!(
                "Environment variable {} has an empty valueFrom. Variable omitted.",
                var.name
            ));
            return None;
        };
        report.unsupported(format!(
            "Environment variable {} uses {}, which is not supported in ACA. Variable omitted.",
            var.name, kind
        ));
        None
    }

    fn map_volumes(
        &mut self,
        container: &Container,
        mounts: &[VolumeMount],
        pod: &PodSpec,
        report: &mut MigrationReport,
    ) -> Result<Vec<AcaVolumeMount>> {
        let mut mapped = Vec::new();

        for mount in mounts {
            let Some(volume) = pod.volume(&mount.name) else {
                report.warning(format!(
                    "Volume mount '{}' in container {} references an undeclared volume. Mount omitted.",
                    mount.name,
                    container.display_name()
                ));
                continue;
            };

            let storage_type = if volume.is_azure_file() {
                Some(StorageType::AzureFile)
            } else {
                let prompt = format!("How do you want to handle volume '{}'?", volume.name);
                let answer = choose(
                    &mut *self.resolver,
                    &prompt,
                    &[VOLUME_SKIP, VOLUME_AZURE_FILE, VOLUME_AZURE_BLOB],
                )?;
                let storage_type = match answer.as_str() {
                    VOLUME_AZURE_FILE => Some(StorageType::AzureFile),
                    VOLUME_AZURE_BLOB => Some(StorageType::AzureBlob),
                    _ => None,
                };
                let outcome = match storage_type {
                    Some(storage) => format!("mapped as {}", storage.as_str()),
                    None => "mount skipped".to_string(),
                };
                report.warning(format!(
                    "Volume type '{}' for '{}' not directly supported in ACA; {}.",
                    volume.source_type(),
                    volume.name,
                    outcome
                ));
                storage_type
            };

            if let Some(storage_type) = storage_type {
                mapped.push(AcaVolumeMount {
                    name: mount.name.clone(),
                    storage_type,
                    mount_path: mount.mount_path.clone(),
                });
            }
        }

        Ok(mapped)
    }
}

fn map_cpu(container: &Container, report: &mut MigrationReport) -> f64 {
    let name = container.display_name();
    match container.resources.get("cpu") {
        Some((quantity, source)) => parse_cpu(quantity.as_str()).unwrap_or_else(|| {
            report.warning(format!(
                "Could not parse CPU {} '{}' for container {}. Using default {:.1}.",
                source.label(),
                quantity,
                name,
                DEFAULT_CPU
            ));
            DEFAULT_CPU
        }),
        None => {
            report.warning(format!(
                "No CPU limit or request for container {}. Using default {:.1}.",
                name, DEFAULT_CPU
            ));
            DEFAULT_CPU
        }
    }
}

/// Normalized memory in Gi
fn map_memory(container: &Container, report: &mut MigrationReport) -> f64 {
    let name = container.display_name();
    let default = format_memory_gi(DEFAULT_MEMORY_GI);

    let Some((quantity, source)) = container.resources.get("memory") else {
        report.warning(format!(
            "No memory limit or request for container {}. Using default {}.",
            name, default
        ));
        return DEFAULT_MEMORY_GI;
    };

    match parse_memory_gi(quantity.as_str()) {
        Ok(gi) => gi,
        Err(MemoryIssue::UnknownUnit) => {
            report.warning(format!(
                "Memory value '{}' for container {} not in Mi/Gi. Using default {}.",
                quantity, name, default
            ));
            DEFAULT_MEMORY_GI
        }
        Err(MemoryIssue::Unparseable) => {
            report.warning(format!(
                "Could not parse memory {} '{}' for container {}. Using default {}.",
                source.label(),
                quantity,
                name,
                default
            ));
            DEFAULT_MEMORY_GI
        }
    }
}

fn map_ports(container: &Container) -> Vec<AcaPort> {
    container
        .ports
        .iter()
        .filter_map(|p| p.container_port)
        .map(|port| AcaPort { port })
        .collect()
}

fn map_probes(container: &Container, report: &mut MigrationReport) -> Option<AcaProbes> {
    let probes = AcaProbes {
        liveness_probe: container
            .liveness_probe
            .as_ref()
            .and_then(|p| map_probe("livenessProbe", p, container, report)),
        readiness_probe: container
            .readiness_probe
            .as_ref()
            .and_then(|p| map_probe("readinessProbe", p, container, report)),
    };
    (!probes.is_empty()).then_some(probes)
}

fn map_probe(
    slot: &str,
    probe: &Probe,
    container: &Container,
    report: &mut MigrationReport,
) -> Option<AcaProbe> {
    if let Some(http) = &probe.http_get {
        return Some(AcaProbe {
            probe_type: ProbeType::Http,
            path: Some(http.path.clone().unwrap_or_else(|| "/".to_string())),
            port: http.port.clone(),
        });
    }
    if let Some(tcp) = &probe.tcp_socket {
        return Some(AcaProbe {
            probe_type: ProbeType::Tcp,
            path: None,
            port: tcp.port.clone(),
        });
    }

    report.warning(format!(
        "Probe type '{}' in {} for container {} not directly supported in ACA. Probe omitted.",
        probe.mechanism(),
        slot,
        container.display_name()
    ));
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use crate::resolver::ScriptedResolver;
    use k8s2aca_core::PortRef;
    use std::collections::BTreeMap;

    fn pod(yaml: &str) -> PodSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn tables() -> (KeyValueTable, KeyValueTable) {
        let mut config_maps = KeyValueTable::new();
        config_maps.insert(
            "settings",
            BTreeMap::from([("MODE".to_string(), "prod".to_string())]),
        );
        let mut secrets = KeyValueTable::new();
        secrets.insert(
            "creds",
            BTreeMap::from([("password".to_string(), "hunter2".to_string())]),
        );
        (config_maps, secrets)
    }

    fn map_with(
        spec: &PodSpec,
        resolver: &mut ScriptedResolver,
    ) -> (MappedContainer, MigrationReport) {
        let (config_maps, secrets) = tables();
        let mut report = MigrationReport::new();
        let mut mapper = ContainerMapper::new(&config_maps, &secrets, resolver);
        let mapped = mapper.map(&spec.containers[0], spec, &mut report).unwrap();
        (mapped, report)
    }

    fn map_one(spec: &PodSpec) -> (MappedContainer, MigrationReport) {
        map_with(spec, &mut ScriptedResolver::default())
    }

    fn messages(report: &MigrationReport, severity: Severity) -> Vec<String> {
        report
            .entries()
            .iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_resources_from_limits_and_requests() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits:
        cpu: 500m
      requests:
        cpu: "4"
        memory: 512Mi
"#);
        let (mapped, report) = map_one(&spec);
        assert_eq!(mapped.container.resources.cpu, 0.5);
        assert_eq!(mapped.container.resources.memory, "0.5Gi");
        assert!(!mapped.needs_dedicated);
        assert!(report.is_empty());
    }

    #[test]
    fn test_missing_resources_use_defaults() {
        let spec = pod("containers:\n  - name: app\n    image: nginx\n");
        let (mapped, report) = map_one(&spec);

        assert_eq!(mapped.container.resources.cpu, 2.0);
        assert_eq!(mapped.container.resources.memory, "8.0Gi");
        assert!(!mapped.needs_dedicated);

        let warnings = messages(&report, Severity::Warning);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("No CPU limit or request for container app"));
        assert!(warnings[1].contains("Using default 8.0Gi"));
    }

    #[test]
    fn test_unknown_memory_unit() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Ti}
"#);
        let (mapped, report) = map_one(&spec);
        assert_eq!(mapped.container.resources.memory, "8.0Gi");
        assert_eq!(
            messages(&report, Severity::Warning),
            vec!["Memory value '1Ti' for container app not in Mi/Gi. Using default 8.0Gi."]
        );
    }

    #[test]
    fn test_unparseable_cpu() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: lots, memory: 1Gi}
"#);
        let (mapped, report) = map_one(&spec);
        assert_eq!(mapped.container.resources.cpu, 2.0);
        assert_eq!(
            messages(&report, Severity::Warning),
            vec!["Could not parse CPU limit 'lots' for container app. Using default 2.0."]
        );
    }

    #[test]
    fn test_large_memory_needs_dedicated() {
        let spec = pod(r#"
containers:
  - name: big
    image: trainer
    resources:
      limits: {cpu: "8", memory: 16Gi}
"#);
        let (mapped, report) = map_one(&spec);
        assert!(mapped.needs_dedicated);
        assert_eq!(mapped.container.resources.memory, "16.0Gi");
        assert_eq!(report.count_by_severity(Severity::Info), 1);
    }

    #[test]
    fn test_gpu_sku_selected() {
        let spec = pod(r#"
containers:
  - name: gpu
    image: cuda
    resources:
      limits: {cpu: "4", memory: 8Gi, nvidia.com/gpu: 2}
"#);
        let mut resolver = ScriptedResolver::new(["A100"]);
        let (mapped, _report) = map_with(&spec, &mut resolver);

        assert_eq!(mapped.container.resources.gpus, Some(2));
        assert_eq!(mapped.container.resources.gpu_sku, Some(GpuSku::A100));
        assert_eq!(resolver.prompts().len(), 1);
    }

    #[test]
    fn test_gpu_skipped() {
        let spec = pod(r#"
containers:
  - name: gpu
    image: cuda
    resources:
      limits: {cpu: "4", memory: 8Gi, nvidia.com/gpu: 1}
"#);
        let mut resolver = ScriptedResolver::new([GPU_SKIP]);
        let (mapped, report) = map_with(&spec, &mut resolver);

        assert_eq!(mapped.container.resources.gpus, None);
        assert_eq!(mapped.container.resources.gpu_sku, None);
        assert_eq!(
            messages(&report, Severity::Warning),
            vec!["GPU mapping skipped for container gpu. Will run on CPU only."]
        );
    }

    #[test]
    fn test_zero_gpus_does_not_prompt() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi, nvidia.com/gpu: 0}
"#);
        let mut resolver = ScriptedResolver::default();
        let (mapped, report) = map_with(&spec, &mut resolver);
        assert!(resolver.prompts().is_empty());
        assert!(mapped.container.resources.gpus.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_env_resolution() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi}
    env:
      - name: LITERAL
        value: hello
      - name: MODE
        valueFrom:
          configMapKeyRef: {name: settings, key: MODE}
      - name: PASSWORD
        valueFrom:
          secretKeyRef: {name: creds, key: password}
      - name: MISSING
        valueFrom:
          configMapKeyRef: {name: absent, key: LEVEL}
      - name: POD_IP
        valueFrom:
          fieldRef: {fieldPath: status.podIP}
"#);
        let (mapped, report) = map_one(&spec);

        let env: Vec<(&str, &str)> = mapped
            .container
            .env
            .iter()
            .map(|e| (e.name.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(
            env,
            vec![("LITERAL", "hello"), ("MODE", "prod"), ("PASSWORD", "hunter2")]
        );

        let warnings = messages(&report, Severity::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("absent"));
        assert!(warnings[0].contains("LEVEL"));
        assert!(warnings[0].contains("Azure App Configuration"));

        assert_eq!(report.count_by_severity(Severity::Unsupported), 1);
        assert_eq!(report.count_by_severity(Severity::Info), 1);
    }

    #[test]
    fn test_missing_secret_suggests_key_vault() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi}
    env:
      - name: TOKEN
        valueFrom:
          secretKeyRef: {name: creds, key: token}
"#);
        let (mapped, report) = map_one(&spec);
        assert!(mapped.container.env.is_empty());
        assert_eq!(
            messages(&report, Severity::Warning),
            vec![
                "Secret creds or key token not found for environment variable TOKEN. Consider using Azure Key Vault."
            ]
        );
    }

    #[test]
    fn test_ports_and_probes() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi}
    ports:
      - containerPort: 8080
        protocol: TCP
      - name: no-container-port
    livenessProbe:
      tcpSocket: {port: 8080}
    readinessProbe:
      exec:
        command: [cat, /tmp/ready]
"#);
        let (mapped, report) = map_one(&spec);

        assert_eq!(mapped.container.ports, vec![AcaPort { port: 8080 }]);
        let probes = mapped.container.probes.unwrap();
        assert_eq!(
            probes.liveness_probe,
            Some(AcaProbe {
                probe_type: ProbeType::Tcp,
                path: None,
                port: PortRef::Number(8080),
            })
        );
        assert!(probes.readiness_probe.is_none());
        assert_eq!(
            messages(&report, Severity::Warning),
            vec![
                "Probe type 'exec' in readinessProbe for container app not directly supported in ACA. Probe omitted."
            ]
        );
    }

    #[test]
    fn test_http_probe() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi}
    readinessProbe:
      httpGet: {path: /ready, port: http}
"#);
        let (mapped, _) = map_one(&spec);
        let probe = mapped.container.probes.unwrap().readiness_probe.unwrap();
        assert_eq!(probe.probe_type, ProbeType::Http);
        assert_eq!(probe.path.as_deref(), Some("/ready"));
        assert_eq!(probe.port, PortRef::Name("http".into()));
    }

    #[test]
    fn test_volumes() {
        let spec = pod(r#"
containers:
  - name: app
    image: nginx
    resources:
      limits: {cpu: "1", memory: 1Gi}
    volumeMounts:
      - {name: share, mountPath: /share}
      - {name: cache, mountPath: /cache}
      - {name: scratch, mountPath: /scratch}
      - {name: ghost, mountPath: /ghost}
volumes:
  - name: share
    azureFile: {shareName: data, secretName: storage}
  - name: cache
    emptyDir: {}
  - name: scratch
    persistentVolumeClaim: {claimName: scratch}
"#);
        let mut resolver = ScriptedResolver::new([VOLUME_AZURE_BLOB, VOLUME_SKIP]);
        let (mapped, report) = map_with(&spec, &mut resolver);

        assert_eq!(
            mapped.container.volume_mounts,
            Some(vec![
                AcaVolumeMount {
                    name: "share".into(),
                    storage_type: StorageType::AzureFile,
                    mount_path: "/share".into(),
                },
                AcaVolumeMount {
                    name: "cache".into(),
                    storage_type: StorageType::AzureBlob,
                    mount_path: "/cache".into(),
                },
            ])
        );
        assert_eq!(resolver.prompts().len(), 2);
        assert_eq!(resolver.remaining(), 0);
        assert_eq!(
            messages(&report, Severity::Warning),
            vec![
                "Volume type 'emptyDir' for 'cache' not directly supported in ACA; mapped as AzureBlob.",
                "Volume type 'persistentVolumeClaim' for 'scratch' not directly supported in ACA; mount skipped.",
                "Volume mount 'ghost' in container app references an undeclared volume. Mount omitted.",
            ]
        );
    }

    #[test]
    fn test_missing_image_is_error_but_container_kept() {
        let spec = pod("containers:\n  - name: app\n    resources: {limits: {cpu: '1', memory: 1Gi}}\n");
        let (mapped, report) = map_one(&spec);
        assert_eq!(mapped.container.name.as_deref(), Some("app"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_resolver_failure_propagates() {
        let spec = pod(r#"
containers:
  - name: gpu
    image: cuda
    resources:
      limits: {cpu: "1", memory: 1Gi, nvidia.com/gpu: 1}
"#);
        let (config_maps, secrets) = tables();
        let mut resolver = ScriptedResolver::default();
        let mut report = MigrationReport::new();
        let mut mapper = ContainerMapper::new(&config_maps, &secrets, &mut resolver);
        assert!(mapper.map(&spec.containers[0], &spec, &mut report).is_err());
    }
}
