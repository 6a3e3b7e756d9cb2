//! Serving container configuration.
//!
//! Controls how per-model TensorFlow Serving containers are named, labelled,
//! addressed and probed for readiness.

use std::time::Duration;

use serde::Deserialize;

use super::profile::Profile;
use crate::application::container::OrchestratorConfig;

/// Configuration for the container orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSettings {
    /// Deployment profile selecting host-port or overlay addressing.
    ///
    /// Defaults to [`Profile::Host`].
    #[serde(default)]
    pub profile: Profile,

    /// Serving image. Defaults to `tensorflow/serving:latest`.
    #[serde(default = "default_image")]
    pub image: String,

    /// Prefix of every container name. Defaults to `tf_`.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Owner label key. Defaults to `project`.
    #[serde(default = "default_label_key")]
    pub label_key: String,

    /// Owner label value. Defaults to `ModelServerREST`.
    #[serde(default = "default_label_value")]
    pub label_value: String,

    /// First host port probed in the host profile. Defaults to 8501.
    #[serde(default = "default_port_range_start")]
    pub port_range_start: u16,

    /// Last host port probed in the host profile. Defaults to 8999.
    #[serde(default = "default_port_range_end")]
    pub port_range_end: u16,

    /// Overlay network joined in the overlay profile. Defaults to `modelplane`.
    #[serde(default = "default_network")]
    pub network: String,

    /// REST port inside the container. Defaults to 8501.
    #[serde(default = "default_rest_port")]
    pub rest_port: u16,

    /// gRPC port inside the container. Defaults to 8500.
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// Delay between readiness probes in milliseconds. Defaults to 1000ms.
    #[serde(default = "default_readiness_interval_ms")]
    pub readiness_interval_ms: u64,

    /// Upper bound on waiting for a container to become ready.
    ///
    /// A container that is still not serving afterwards is removed.
    /// Defaults to 60 seconds.
    #[serde(default = "default_readiness_timeout_secs")]
    pub readiness_timeout_secs: u64,

    /// Container engine binary. Defaults to `docker`.
    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,
}

fn default_image() -> String {
    "tensorflow/serving:latest".into()
}

fn default_name_prefix() -> String {
    "tf_".into()
}

fn default_label_key() -> String {
    "project".into()
}

fn default_label_value() -> String {
    "ModelServerREST".into()
}

const fn default_port_range_start() -> u16 {
    8501
}

const fn default_port_range_end() -> u16 {
    8999
}

fn default_network() -> String {
    "modelplane".into()
}

const fn default_rest_port() -> u16 {
    8501
}

const fn default_grpc_port() -> u16 {
    8500
}

const fn default_readiness_interval_ms() -> u64 {
    1000
}

const fn default_readiness_timeout_secs() -> u64 {
    60
}

fn default_docker_bin() -> String {
    "docker".into()
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            image: default_image(),
            name_prefix: default_name_prefix(),
            label_key: default_label_key(),
            label_value: default_label_value(),
            port_range_start: default_port_range_start(),
            port_range_end: default_port_range_end(),
            network: default_network(),
            rest_port: default_rest_port(),
            grpc_port: default_grpc_port(),
            readiness_interval_ms: default_readiness_interval_ms(),
            readiness_timeout_secs: default_readiness_timeout_secs(),
            docker_bin: default_docker_bin(),
        }
    }
}

impl ContainerSettings {
    /// Convert to the orchestrator configuration type.
    #[must_use]
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            image: self.image.clone(),
            name_prefix: self.name_prefix.clone(),
            label_key: self.label_key.clone(),
            label_value: self.label_value.clone(),
            addressing: self
                .profile
                .addressing((self.port_range_start, self.port_range_end), &self.network),
            rest_port: self.rest_port,
            grpc_port: self.grpc_port,
            readiness_interval: Duration::from_millis(self.readiness_interval_ms),
            readiness_timeout: Duration::from_secs(self.readiness_timeout_secs),
        }
    }

    /// Number of host ports in the configured range, zero when inverted.
    #[must_use]
    pub fn port_range_len(&self) -> u32 {
        if self.port_range_end < self.port_range_start {
            0
        } else {
            u32::from(self.port_range_end - self.port_range_start) + 1
        }
    }
}
