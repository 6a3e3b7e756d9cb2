//! Container engine adapter driving the `docker` CLI.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::domain::{ContainerState, ContainerSummary};
use crate::error::{Error, Result};
use crate::port::outbound::engine::{ContainerEngine, ContainerSpec, MODEL_NAME_LABEL};

const FIELD_SEPARATOR: char = '\t';

/// Talks to the container engine through its command-line client.
pub struct DockerCli {
    bin: String,
}

impl DockerCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn exec(&self, args: &[String]) -> Result<Output> {
        trace!(bin = %self.bin, ?args, "Running container CLI");
        Command::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::engine(format!("failed to run {}: {e}", self.bin)))
    }

    fn failure(&self, action: &str, output: &Output) -> Error {
        Error::engine(format!(
            "{} {action} failed: {}",
            self.bin,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

fn is_missing(output: &Output) -> bool {
    String::from_utf8_lossy(&output.stderr)
        .to_ascii_lowercase()
        .contains("no such container")
}

fn summary_format() -> String {
    format!(
        "{{{{.ID}}}}{sep}{{{{.Names}}}}{sep}{{{{.State}}}}{sep}{{{{.Label \"{MODEL_NAME_LABEL}\"}}}}",
        sep = FIELD_SEPARATOR
    )
}

fn inspect_format() -> String {
    format!(
        "{{{{.Id}}}}{sep}{{{{.Name}}}}{sep}{{{{.State.Status}}}}{sep}{{{{index .Config.Labels \"{MODEL_NAME_LABEL}\"}}}}",
        sep = FIELD_SEPARATOR
    )
}

/// Parse one `id<TAB>name<TAB>state<TAB>model` line.
pub fn parse_summary(line: &str) -> Option<ContainerSummary> {
    let mut fields = line.trim().split(FIELD_SEPARATOR);
    let id = fields.next().filter(|id| !id.is_empty())?;
    let name = fields.next()?.trim_start_matches('/');
    let state = ContainerState::from_status(fields.next()?);
    let model_name = fields
        .next()
        .map(str::trim)
        .filter(|label| !label.is_empty() && *label != "<no value>")
        .map(ToOwned::to_owned);
    Some(ContainerSummary {
        id: id.to_string(),
        name: name.to_string(),
        state,
        model_name,
    })
}

/// Arguments for `docker run` from a container spec.
#[must_use]
pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        spec.name.clone(),
    ];
    for (key, value) in &spec.labels {
        args.push("--label".into());
        args.push(format!("{key}={value}"));
    }
    for (key, value) in &spec.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    for mount in &spec.mounts {
        let mut mount_arg = format!(
            "type=bind,source={},target={}",
            mount.host_path.display(),
            mount.container_path
        );
        if mount.read_only {
            mount_arg.push_str(",readonly");
        }
        args.push("--mount".into());
        args.push(mount_arg);
    }
    if let Some(port) = spec.port {
        args.push("-p".into());
        args.push(format!("{}:{}", port.host_port, port.container_port));
    }
    if let Some(network) = &spec.network {
        args.push("--network".into());
        args.push(network.clone());
    }
    args.push(spec.image.clone());
    args.extend(spec.args.iter().cloned());
    args
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn inspect(&self, reference: &str) -> Result<Option<ContainerSummary>> {
        let args = vec![
            "inspect".to_string(),
            "--type".to_string(),
            "container".to_string(),
            "--format".to_string(),
            inspect_format(),
            reference.to_string(),
        ];
        let output = self.exec(&args).await?;
        if !output.status.success() {
            if is_missing(&output) {
                return Ok(None);
            }
            return Err(self.failure("inspect", &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .find_map(parse_summary))
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<String> {
        let output = self.exec(&run_args(spec)).await?;
        if !output.status.success() {
            return Err(self.failure("run", &output));
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(Error::engine(format!("{} run returned no container id", self.bin)));
        }
        debug!(container = %spec.name, id = %id, "Container started");
        Ok(id)
    }

    async fn remove_force(&self, reference: &str) -> Result<bool> {
        let args = vec!["rm".to_string(), "-f".to_string(), reference.to_string()];
        let output = self.exec(&args).await?;
        if output.status.success() {
            return Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty());
        }
        if is_missing(&output) {
            return Ok(false);
        }
        Err(self.failure("rm", &output))
    }

    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ContainerSummary>> {
        let args = vec![
            "ps".to_string(),
            "-a".to_string(),
            "--no-trunc".to_string(),
            "--filter".to_string(),
            format!("label={key}={value}"),
            "--format".to_string(),
            summary_format(),
        ];
        let output = self.exec(&args).await?;
        if !output.status.success() {
            return Err(self.failure("ps", &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(parse_summary)
            .collect())
    }

    /// `create` a stopped container from the image, `cp` out of it, then
    /// remove it whatever the copy did.
    async fn copy_from_image(&self, image: &str, source: &str, target: &Path) -> Result<()> {
        let create = vec!["create".to_string(), image.to_string()];
        let output = self.exec(&create).await?;
        if !output.status.success() {
            return Err(self.failure("create", &output));
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(Error::engine(format!("{} create returned no container id", self.bin)));
        }

        let copy = vec![
            "cp".to_string(),
            format!("{id}:{source}"),
            target.to_string_lossy().into_owned(),
        ];
        let copied = match self.exec(&copy).await {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(self.failure("cp", &output)),
            Err(e) => Err(e),
        };

        if let Err(e) = self.remove_force(&id).await {
            warn!(image = %image, container = %id, error = %e, "Failed to remove extraction container");
        }
        copied?;
        debug!(image = %image, source = %source, target = %target.display(), "Copied model out of image");
        Ok(())
    }
}
