//! Service and Ingress mapping
//!
//! Container apps expose one ingress per app. It is derived from the first
//! Service of the stream; the first Ingress only contributes custom
//! domains.

use k8s2aca_core::{Ingress, PortRef, Service};

use crate::aca::{AcaIngress, Transport};
use crate::report::MigrationReport;

/// Target port used when the Service declares none
pub const DEFAULT_TARGET_PORT: i32 = 80;

/// Derive the ACA ingress block
pub fn map_ingress(
    services: &[Service],
    ingresses: &[Ingress],
    report: &mut MigrationReport,
) -> Option<AcaIngress> {
    if services.len() > 1 {
        tracing::debug!(
            ignored = services.len() - 1,
            "only the first Service is mapped to ingress"
        );
    }

    let mut ingress = services.first().and_then(|svc| map_service(svc, report));

    if let Some(first) = ingresses.first() {
        match ingress.as_mut() {
            Some(ingress) => {
                ingress.custom_domains = Some(first.hosts());
                report.info(format!(
                    "Ingress '{}' custom domains mapped to ACA ingress.",
                    first.name
                ));
            }
            None => report.warning(format!(
                "Ingress '{}' found, but no Service mapped. Manual review needed.",
                first.name
            )),
        }
    }

    ingress
}

fn map_service(service: &Service, report: &mut MigrationReport) -> Option<AcaIngress> {
    let service_type = service.spec.service_type.as_deref().unwrap_or("ClusterIP");
    let external = match service_type {
        "LoadBalancer" | "NodePort" => true,
        "ClusterIP" => false,
        other => {
            report.unsupported(format!(
                "Service type '{}' for '{}' not directly supported. Manual review needed.",
                other, service.name
            ));
            return None;
        }
    };

    let target_port = target_port(service, report);
    report.info(format!(
        "Service '{}' mapped to ACA ingress ({}).",
        service.name,
        if external { "external" } else { "internal" }
    ));

    Some(AcaIngress {
        external,
        target_port,
        transport: Transport::Auto,
        custom_domains: None,
    })
}

fn target_port(service: &Service, report: &mut MigrationReport) -> i32 {
    let Some(port) = service
        .spec
        .ports
        .first()
        .and_then(|p| p.target_port.as_ref())
    else {
        return DEFAULT_TARGET_PORT;
    };

    match port.as_number() {
        Some(number) => number,
        None => {
            if let PortRef::Name(name) = port {
                report.warning(format!(
                    "Named target port '{}' on Service '{}' cannot be resolved. Using port {}.",
                    name, service.name, DEFAULT_TARGET_PORT
                ));
            }
            DEFAULT_TARGET_PORT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn service(name: &str, spec: &str) -> Service {
        Service {
            name: name.to_string(),
            spec: serde_yaml::from_str(spec).unwrap(),
        }
    }

    fn ingress(name: &str, spec: &str) -> Ingress {
        Ingress {
            name: name.to_string(),
            spec: serde_yaml::from_str(spec).unwrap(),
        }
    }

    #[test]
    fn test_cluster_ip_is_internal() {
        let services = [service(
            "web",
            "type: ClusterIP\nports:\n  - port: 80\n    targetPort: 8080\n",
        )];
        let mut report = MigrationReport::new();

        let mapped = map_ingress(&services, &[], &mut report).unwrap();
        assert_eq!(
            mapped,
            AcaIngress {
                external: false,
                target_port: 8080,
                transport: Transport::Auto,
                custom_domains: None,
            }
        );
        assert_eq!(
            report.to_string(),
            "[Info] Service 'web' mapped to ACA ingress (internal).\n"
        );
    }

    #[test]
    fn test_load_balancer_and_node_port_are_external() {
        for kind in ["LoadBalancer", "NodePort"] {
            let services = [service("web", &format!("type: {}\n", kind))];
            let mut report = MigrationReport::new();
            let mapped = map_ingress(&services, &[], &mut report).unwrap();
            assert!(mapped.external);
            assert_eq!(mapped.target_port, DEFAULT_TARGET_PORT);
        }
    }

    #[test]
    fn test_missing_type_defaults_to_cluster_ip() {
        let services = [service("web", "ports:\n  - targetPort: \"9000\"\n")];
        let mut report = MigrationReport::new();
        let mapped = map_ingress(&services, &[], &mut report).unwrap();
        assert!(!mapped.external);
        assert_eq!(mapped.target_port, 9000);
    }

    #[test]
    fn test_named_target_port_falls_back() {
        let services = [service("web", "ports:\n  - targetPort: http\n")];
        let mut report = MigrationReport::new();
        let mapped = map_ingress(&services, &[], &mut report).unwrap();
        assert_eq!(mapped.target_port, 80);
        assert_eq!(report.count_by_severity(Severity::Warning), 1);
    }

    #[test]
    fn test_external_name_is_unsupported() {
        let services = [service("db", "type: ExternalName\nexternalName: db.example.com\n")];
        let mut report = MigrationReport::new();
        assert!(map_ingress(&services, &[], &mut report).is_none());
        assert_eq!(
            report.to_string(),
            "[Unsupported] Service type 'ExternalName' for 'db' not directly supported. Manual review needed.\n"
        );
    }

    #[test]
    fn test_ingress_hosts_become_custom_domains() {
        let services = [service("web", "type: LoadBalancer\n")];
        let ingresses = [ingress(
            "public",
            "rules:\n  - host: app.example.com\n  - http: {}\n  - host: www.example.com\n",
        )];
        let mut report = MigrationReport::new();

        let mapped = map_ingress(&services, &ingresses, &mut report).unwrap();
        assert_eq!(
            mapped.custom_domains,
            Some(vec!["app.example.com".to_string(), "www.example.com".to_string()])
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_orphan_ingress() {
        let ingresses = [ingress("public", "rules: []\n")];
        let mut report = MigrationReport::new();
        assert!(map_ingress(&[], &ingresses, &mut report).is_none());
        assert_eq!(
            report.to_string(),
            "[Warning] Ingress 'public' found, but no Service mapped. Manual review needed.\n"
        );
    }

    #[test]
    fn test_first_service_wins() {
        let services = [
            service("first", "type: ClusterIP\n"),
            service("second", "type: LoadBalancer\n"),
        ];
        let mut report = MigrationReport::new();
        let mapped = map_ingress(&services, &[], &mut report).unwrap();
        assert!(!mapped.external);
        assert_eq!(report.len(), 1);
    }
}
