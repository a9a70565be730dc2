//! Pod spec document and its derivation from configuration.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use zk_core::Result;

use crate::config::{CharmConfig, RawConfig};

/// Pod spec format version understood by the platform.
pub const SPEC_VERSION: u32 = 2;

pub const DATA_DIR: &str = "/var/lib/zookeeper/data";
pub const DATA_LOG_DIR: &str = "/var/lib/zookeeper/data/log";
pub const CONF_DIR: &str = "/opt/zookeeper/conf";

pub const PORT_CLIENT: &str = "client";
pub const PORT_SERVER: &str = "server";
pub const PORT_LEADER_ELECTION: &str = "leader-election";

const PROBE_INITIAL_DELAY_SECONDS: u32 = 10;
const READINESS_TIMEOUT_SECONDS: u32 = 5;
const READINESS_FAILURE_THRESHOLD: u32 = 6;

/// Declarative workload document submitted to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub version: u32,
    pub containers: Vec<ContainerSpec>,
}

impl PodSpec {
    /// The Zookeeper container, if present.
    #[must_use]
    pub fn container(&self) -> Option<&ContainerSpec> {
        self.containers.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub ports: Vec<ContainerPort>,
    pub kubernetes: KubernetesSpec,
    pub command: Vec<String>,
}

impl ContainerSpec {
    /// Look up a named port.
    #[must_use]
    pub fn port(&self, name: &str) -> Option<u16> {
        self.ports
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.container_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
}

/// Kubernetes-specific container settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSpec {
    pub readiness_probe: Probe,
    pub liveness_probe: Probe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub tcp_socket: TcpSocket,
    pub initial_delay_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpSocket {
    pub port: u16,
}

/// Derive the pod spec for a validated configuration.
///
/// Pure: the same configuration and application name always yield an equal
/// document.
#[must_use]
pub fn derive_specification(config: &CharmConfig, app_name: &str) -> PodSpec {
    let ports = [
        (PORT_CLIENT, config.client_port),
        (PORT_SERVER, config.server_port),
        (PORT_LEADER_ELECTION, config.leader_election_port),
    ]
    .into_iter()
    .map(|(name, container_port)| ContainerPort {
        name: name.to_string(),
        container_port,
    })
    .collect_vec();

    let client = TcpSocket {
        port: config.client_port,
    };

    PodSpec {
        version: SPEC_VERSION,
        containers: vec![ContainerSpec {
            name: app_name.to_string(),
            image: config.image.clone(),
            ports,
            kubernetes: KubernetesSpec {
                readiness_probe: Probe {
                    tcp_socket: client,
                    initial_delay_seconds: PROBE_INITIAL_DELAY_SECONDS,
                    timeout_seconds: Some(READINESS_TIMEOUT_SECONDS),
                    failure_threshold: Some(READINESS_FAILURE_THRESHOLD),
                },
                liveness_probe: Probe {
                    tcp_socket: client,
                    initial_delay_seconds: PROBE_INITIAL_DELAY_SECONDS,
                    timeout_seconds: None,
                    failure_threshold: None,
                },
            },
            command: start_command(config.num_units),
        }],
    }
}

/// Validate a raw configuration and derive its pod spec.
///
/// # Errors
///
/// Returns `Error::Configuration` if any required key is missing or malformed.
pub fn derive_from_raw(raw: &RawConfig, app_name: &str) -> Result<PodSpec> {
    CharmConfig::from_raw(raw).map(|config| derive_specification(&config, app_name))
}

/// Shell command that starts the ensemble member.
#[must_use]
pub fn start_command(num_units: u32) -> Vec<String> {
    let script = format!(
        "start-zookeeper --servers={num_units} --data_dir={DATA_DIR} \
         --data_log_dir={DATA_LOG_DIR} --conf_dir={CONF_DIR}"
    );
    vec!["sh".to_string(), "-c".to_string(), script]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::indexing_slicing)]

    use super::*;

    fn config(num_units: u32) -> CharmConfig {
        CharmConfig {
            image: "zk:3.4".to_string(),
            client_port: 2181,
            server_port: 2888,
            leader_election_port: 3888,
            num_units,
        }
    }

    #[test]
    fn test_spec_has_three_named_ports() {
        let spec = derive_specification(&config(3), "zookeeper");
        let container = spec.container();
        assert_eq!(container.and_then(|c| c.port(PORT_CLIENT)), Some(2181));
        assert_eq!(container.and_then(|c| c.port(PORT_SERVER)), Some(2888));
        assert_eq!(
            container.and_then(|c| c.port(PORT_LEADER_ELECTION)),
            Some(3888)
        );
        assert_eq!(container.map(|c| c.ports.len()), Some(3));
    }

    #[test]
    fn test_probes_check_client_port() {
        let spec = derive_specification(&config(3), "zookeeper");
        let probes = spec.container().map(|c| c.kubernetes.clone());
        let Some(probes) = probes else {
            panic!("container missing");
        };
        assert_eq!(probes.readiness_probe.tcp_socket.port, 2181);
        assert_eq!(probes.readiness_probe.initial_delay_seconds, 10);
        assert_eq!(probes.readiness_probe.timeout_seconds, Some(5));
        assert_eq!(probes.readiness_probe.failure_threshold, Some(6));
        assert_eq!(probes.liveness_probe.tcp_socket.port, 2181);
        assert_eq!(probes.liveness_probe.initial_delay_seconds, 10);
        assert_eq!(probes.liveness_probe.timeout_seconds, None);
    }

    #[test]
    fn test_command_embeds_replica_count_and_paths() {
        let command = start_command(3);
        assert_eq!(command.first().map(String::as_str), Some("sh"));
        let script = command.get(2).cloned().unwrap_or_default();
        assert!(script.contains("--servers=3"));
        assert!(script.contains("--data_dir=/var/lib/zookeeper/data "));
        assert!(script.contains("--data_log_dir=/var/lib/zookeeper/data/log"));
        assert!(script.contains("--conf_dir=/opt/zookeeper/conf"));
    }

    #[test]
    fn test_replica_change_only_touches_command() {
        let three = derive_specification(&config(3), "zookeeper");
        let mut five = derive_specification(&config(5), "zookeeper");
        assert_ne!(three, five);

        for container in &mut five.containers {
            container.command = start_command(3);
        }
        assert_eq!(three, five);
    }

    #[test]
    fn test_serialized_shape_uses_platform_keys() {
        let spec = derive_specification(&config(3), "zookeeper");
        let json = serde_json::to_value(&spec).unwrap_or_default();
        assert_eq!(json["version"], 2);
        assert_eq!(json["containers"][0]["ports"][0]["containerPort"], 2181);
        assert_eq!(
            json["containers"][0]["kubernetes"]["readinessProbe"]["tcpSocket"]["port"],
            2181
        );
        assert!(json["containers"][0]["kubernetes"]["livenessProbe"]
            .get("timeoutSeconds")
            .is_none());
    }

    #[test]
    fn test_derive_from_raw_propagates_configuration_error() {
        let raw = RawConfig::new().with("image", "zk:3.4");
        assert!(matches!(
            derive_from_raw(&raw, "zookeeper"),
            Err(zk_core::Error::Configuration { .. })
        ));
    }
}
