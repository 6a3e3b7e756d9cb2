//! Serving endpoint allocation.
//!
//! Two addressing strategies exist, selected by deployment profile: publish a
//! free host port from a bounded range, or address the container by name on
//! an internal overlay network without touching host ports at all.

use std::collections::BTreeSet;
use std::net::TcpListener;

use crate::error::{ContainerError, Result};

/// How serving containers are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Publish the first unbound host port in `start..=end`.
    HostPort { start: u16, end: u16 },
    /// Join `network` and address the container by name.
    Overlay { network: String },
}

/// Resolved network location of a serving container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Host port to publish, `None` on an overlay network.
    pub host_port: Option<u16>,
}

impl Endpoint {
    /// Base URL for a served model.
    #[must_use]
    pub fn model_url(&self, serving_name: &str) -> String {
        format!("http://{}:{}/v1/models/{}", self.host, self.port, serving_name)
    }

    /// URL polled for model readiness.
    #[must_use]
    pub fn status_url(&self, serving_name: &str) -> String {
        self.model_url(serving_name)
    }

    /// URL that accepts prediction requests.
    #[must_use]
    pub fn serving_url(&self, serving_name: &str) -> String {
        format!("{}:predict", self.model_url(serving_name))
    }
}

/// Whether nothing is bound to `port` on the loopback interface.
#[must_use]
pub fn is_port_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Pick an endpoint for `container_name`.
///
/// `reserved` holds host ports already claimed by known containers that may
/// not have bound their port yet.
pub fn allocate(
    addressing: &Addressing,
    container_name: &str,
    container_port: u16,
    reserved: &BTreeSet<u16>,
) -> Result<Endpoint> {
    allocate_with(addressing, container_name, container_port, reserved, is_port_free)
}

/// [`allocate`] with an injectable port check.
pub fn allocate_with<F>(
    addressing: &Addressing,
    container_name: &str,
    container_port: u16,
    reserved: &BTreeSet<u16>,
    port_free: F,
) -> Result<Endpoint>
where
    F: Fn(u16) -> bool,
{
    match addressing {
        Addressing::HostPort { start, end } => {
            let port = (*start..=*end)
                .find(|port| !reserved.contains(port) && port_free(*port))
                .ok_or(ContainerError::NoFreePort {
                    start: *start,
                    end: *end,
                })?;
            Ok(Endpoint {
                host: "localhost".to_string(),
                port,
                host_port: Some(port),
            })
        }
        Addressing::Overlay { .. } => Ok(Endpoint {
            host: container_name.to_string(),
            port: container_port,
            host_port: None,
        }),
    }
}
