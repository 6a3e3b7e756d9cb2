//! Per-model inference container orchestration.
//!
//! Every model served out-of-process gets exactly one container, named
//! deterministically from the model name and labelled as owned by this
//! control plane. The persisted record of which container serves which model
//! is a cache: on every `ensure` and `stop` it is reconciled against what the
//! engine actually reports.
//!
//! ```text
//! ensure(model)
//!   |-- reconcile records <-- engine.list_by_label
//!   |-- reuse runnable container ------------------------> record
//!   |-- remove leftover by name
//!   |-- allocate endpoint (host port | overlay name)
//!   |-- engine.run
//!   +-- poll probe until Available --(timeout)--> remove, error
//!                  |
//!                  v
//!           persist record
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use futures_util::future::join_all;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::endpoint::{self, Addressing, Endpoint};
use crate::application::locks::NameLocks;
use crate::domain::{ContainerPhase, ContainerRecord, ContainerSummary, SweepReport};
use crate::error::{ContainerError, Result};
use crate::port::outbound::engine::{
    ContainerEngine, ContainerSpec, Mount, PortBinding, MODEL_NAME_LABEL,
};
use crate::port::outbound::probe::{ProbeStatus, ReadinessProbe};
use crate::port::outbound::serving::ServingBackend;
use crate::port::outbound::store::ContainerRecordStore;

/// Configuration for the container orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Serving image to run.
    pub image: String,
    /// Prefix of deterministic container names.
    pub name_prefix: String,
    /// Ownership label key.
    pub label_key: String,
    /// Ownership label value.
    pub label_value: String,
    /// Host port or overlay addressing.
    pub addressing: Addressing,
    /// REST port inside the container.
    pub rest_port: u16,
    /// gRPC port inside the container.
    pub grpc_port: u16,
    /// Delay between readiness checks.
    pub readiness_interval: Duration,
    /// Upper bound on waiting for readiness.
    pub readiness_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            image: "tensorflow/serving:latest".into(),
            name_prefix: "tf_".into(),
            label_key: "project".into(),
            label_value: "ModelServerREST".into(),
            addressing: Addressing::HostPort {
                start: 8501,
                end: 8999,
            },
            rest_port: 8501,
            grpc_port: 8500,
            readiness_interval: Duration::from_secs(1),
            readiness_timeout: Duration::from_secs(60),
        }
    }
}

/// Engine-safe name for `model`.
///
/// Characters engines reject become `-`. When that changes anything, a stable
/// hash of the raw name is appended so distinct models never share a name.
#[must_use]
pub fn sanitize_name(model: &str) -> String {
    let clean: String = model
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if clean == model {
        clean
    } else {
        format!("{clean}-{:08x}", fnv1a(model.as_bytes()))
    }
}

/// 32-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(2_166_136_261_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(16_777_619)
    })
}

/// Drop records whose container is gone, no longer runnable, or labelled
/// for a different model.
///
/// Returns the model names that were pruned.
pub fn prune_stale(
    records: &mut BTreeMap<String, ContainerRecord>,
    live: &[ContainerSummary],
) -> Vec<String> {
    let mut pruned = Vec::new();
    records.retain(|model, record| {
        let alive = live.iter().any(|summary| {
            (summary.matches(&record.container_id) || summary.matches(&record.container_name))
                && summary.model_name.as_deref() == Some(model.as_str())
                && summary.state.is_runnable()
        });
        if !alive {
            pruned.push(model.clone());
        }
        alive
    });
    pruned
}

/// Starts, reuses, stops and sweeps per-model serving containers.
pub struct ContainerOrchestrator {
    config: OrchestratorConfig,
    engine: Arc<dyn ContainerEngine>,
    probe: Arc<dyn ReadinessProbe>,
    store: Arc<dyn ContainerRecordStore>,
    /// Serializes ensure/stop for the same model.
    locks: NameLocks,
    /// Serializes read-modify-write of the record document.
    store_lock: Mutex<()>,
    /// Host ports handed out to starts that have not persisted a record yet.
    claimed_ports: SyncMutex<BTreeSet<u16>>,
    phases: DashMap<String, ContainerPhase>,
}

/// Holds an in-flight host port until dropped.
struct PortClaim<'a> {
    claimed: &'a SyncMutex<BTreeSet<u16>>,
    port: Option<u16>,
}

impl Drop for PortClaim<'_> {
    fn drop(&mut self) {
        if let Some(port) = self.port {
            self.claimed.lock().remove(&port);
        }
    }
}

impl ContainerOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        engine: Arc<dyn ContainerEngine>,
        probe: Arc<dyn ReadinessProbe>,
        store: Arc<dyn ContainerRecordStore>,
    ) -> Self {
        Self {
            config,
            engine,
            probe,
            store,
            locks: NameLocks::new(),
            store_lock: Mutex::new(()),
            claimed_ports: SyncMutex::new(BTreeSet::new()),
            phases: DashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Deterministic container name for `model`.
    #[must_use]
    pub fn container_name(&self, model: &str) -> String {
        format!("{}{}", self.config.name_prefix, sanitize_name(model))
    }

    /// Orchestrator-side phase of the model's container.
    #[must_use]
    pub fn phase(&self, model: &str) -> ContainerPhase {
        self.phases
            .get(model)
            .map(|phase| *phase)
            .unwrap_or_default()
    }

    /// Make sure exactly one ready container serves `model` from `path`.
    ///
    /// Reuses a live, runnable container when the persisted record still
    /// points at one. Otherwise starts a fresh container and waits for it to
    /// report the model as available. A container that never becomes
    /// available is removed and no record is written.
    pub async fn ensure(&self, model: &str, path: &Path) -> Result<ContainerRecord> {
        let _guard = self.locks.acquire(model).await;

        let live = self.list_owned().await?;
        let records = self.reconcile(&live, None).await;

        if let Some(record) = records.get(model) {
            debug!(model = %model, container = %record.container_name, "Reusing serving container");
            self.phases
                .insert(model.to_string(), ContainerPhase::Available);
            return Ok(record.clone());
        }

        let container_name = self.container_name(model);
        if self.engine.remove_force(&container_name).await? {
            info!(model = %model, container = %container_name, "Removed leftover container");
        }

        let (endpoint, _claim) = self.claim_endpoint(&container_name, &records)?;
        let spec = self.container_spec(model, &container_name, path, &endpoint)?;
        let serving_name = sanitize_name(model);

        self.phases.insert(model.to_string(), ContainerPhase::Starting);
        info!(
            model = %model,
            container = %container_name,
            image = %self.config.image,
            port = endpoint.port,
            "Starting serving container"
        );

        let container_id = match self.engine.run(&spec).await {
            Ok(id) => id,
            Err(e) => {
                self.phases.remove(model);
                if let Err(cleanup) = self.engine.remove_force(&container_name).await {
                    warn!(model = %model, error = %cleanup, "Failed to clean up container after start failure");
                }
                return Err(e);
            }
        };

        let status_endpoint = endpoint.status_url(&serving_name);
        if let Err(e) = self.wait_until_ready(model, &status_endpoint).await {
            self.phases.remove(model);
            if let Err(cleanup) = self.engine.remove_force(&container_id).await {
                warn!(model = %model, error = %cleanup, "Failed to remove container that never became ready");
            }
            return Err(e);
        }

        let record = ContainerRecord {
            model_name: model.to_string(),
            container_id,
            container_name,
            serving_endpoint: endpoint.serving_url(&serving_name),
            status_endpoint,
            host_port: endpoint.host_port,
            created_at: Utc::now(),
        };
        let persisted = record.clone();
        self.update_records(move |records| {
            records.insert(persisted.model_name.clone(), persisted);
        })
        .await;

        self.phases
            .insert(model.to_string(), ContainerPhase::Available);
        info!(model = %model, endpoint = %record.serving_endpoint, "Serving container ready");
        Ok(record)
    }

    /// Remove the container serving `model` and forget its record.
    ///
    /// The record is dropped even if the engine call fails, so a later
    /// `ensure` never reuses a half-removed container. Returns whether a
    /// container existed.
    pub async fn stop(&self, model: &str) -> Result<bool> {
        let _guard = self.locks.acquire(model).await;

        let container_name = self.container_name(model);
        let removal = self.engine.remove_force(&container_name).await;

        let live = match self.list_owned().await {
            Ok(live) => Some(live),
            Err(e) => {
                debug!(error = %e, "Could not list containers while stopping");
                None
            }
        };
        match live {
            Some(live) => {
                self.reconcile(&live, Some(model)).await;
            }
            None => {
                self.update_records(|records| {
                    records.remove(model);
                })
                .await;
            }
        }
        self.phases.remove(model);

        let existed = removal?;
        if existed {
            info!(model = %model, container = %container_name, "Stopped serving container");
        } else {
            debug!(model = %model, container = %container_name, "No serving container to stop");
        }
        Ok(existed)
    }

    /// Every container carrying the ownership label, running or not.
    pub async fn list_owned(&self) -> Result<Vec<ContainerSummary>> {
        self.engine
            .list_by_label(&self.config.label_key, &self.config.label_value)
            .await
    }

    /// Current persisted records.
    pub async fn records(&self) -> BTreeMap<String, ContainerRecord> {
        let _guard = self.store_lock.lock().await;
        self.load_records().await
    }

    /// Remove every owned container regardless of what the records claim.
    pub async fn sweep_owned(&self) -> Result<SweepReport> {
        let owned = self.list_owned().await?;
        let mut report = SweepReport::default();

        let removals = join_all(
            owned
                .iter()
                .map(|container| self.engine.remove_force(&container.id)),
        )
        .await;
        for (container, removal) in owned.iter().zip(removals) {
            match removal {
                Ok(_) => report.removed.push(container.name.clone()),
                Err(e) => {
                    warn!(container = %container.name, error = %e, "Failed to remove container during sweep");
                    report.failed.push((container.name.clone(), e.to_string()));
                }
            }
        }

        let survivors: Vec<ContainerSummary> = owned
            .into_iter()
            .filter(|c| report.failed.iter().any(|(name, _)| *name == c.name))
            .collect();
        self.reconcile(&survivors, None).await;
        self.phases.clear();

        info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Swept owned containers"
        );
        Ok(report)
    }

    /// Allocate an endpoint, holding its host port against concurrent starts
    /// until the returned claim is dropped.
    fn claim_endpoint(
        &self,
        container_name: &str,
        records: &BTreeMap<String, ContainerRecord>,
    ) -> Result<(Endpoint, PortClaim<'_>)> {
        let mut claimed = self.claimed_ports.lock();
        let reserved: BTreeSet<u16> = records
            .values()
            .filter_map(|r| r.host_port)
            .chain(claimed.iter().copied())
            .collect();
        let endpoint = endpoint::allocate(
            &self.config.addressing,
            container_name,
            self.config.rest_port,
            &reserved,
        )?;
        if let Some(port) = endpoint.host_port {
            claimed.insert(port);
        }
        let claim = PortClaim {
            claimed: &self.claimed_ports,
            port: endpoint.host_port,
        };
        Ok((endpoint, claim))
    }

    async fn wait_until_ready(&self, model: &str, status_endpoint: &str) -> Result<()> {
        let deadline = Instant::now() + self.config.readiness_timeout;
        loop {
            match self.probe.check(status_endpoint).await {
                ProbeStatus::Available => return Ok(()),
                ProbeStatus::Pending => {
                    debug!(model = %model, "Model not yet available");
                }
                ProbeStatus::Unreachable(reason) => {
                    debug!(model = %model, reason = %reason, "Serving endpoint not reachable yet");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(model = %model, "Serving container did not become ready");
                return Err(ContainerError::ReadinessTimeout {
                    name: model.to_string(),
                    timeout_secs: self.config.readiness_timeout.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(self.config.readiness_interval.min(deadline - now)).await;
        }
    }

    fn container_spec(
        &self,
        model: &str,
        container_name: &str,
        path: &Path,
        endpoint: &Endpoint,
    ) -> Result<ContainerSpec> {
        let serving_name = sanitize_name(model);
        let model_base = format!("/models/{serving_name}");
        let host_path = absolute(path)?;

        let mut labels = BTreeMap::new();
        labels.insert(self.config.label_key.clone(), self.config.label_value.clone());
        labels.insert(MODEL_NAME_LABEL.to_string(), model.to_string());

        let mut env = BTreeMap::new();
        env.insert("MODEL_NAME".to_string(), serving_name);

        let (port, network) = match &self.config.addressing {
            Addressing::HostPort { .. } => (
                endpoint.host_port.map(|host_port| PortBinding {
                    host_port,
                    container_port: self.config.rest_port,
                }),
                None,
            ),
            Addressing::Overlay { network } => (None, Some(network.clone())),
        };

        Ok(ContainerSpec {
            name: container_name.to_string(),
            image: self.config.image.clone(),
            labels,
            env,
            mounts: vec![Mount {
                host_path,
                container_path: model_base.clone(),
                read_only: true,
            }],
            port,
            network,
            args: vec![
                format!("--model_base_path={model_base}"),
                format!("--rest_api_port={}", self.config.rest_port),
                format!("--port={}", self.config.grpc_port),
            ],
        })
    }

    /// Prune stale records (and optionally `forget`) against `live`.
    async fn reconcile(
        &self,
        live: &[ContainerSummary],
        forget: Option<&str>,
    ) -> BTreeMap<String, ContainerRecord> {
        self.update_records(|records| {
            if let Some(model) = forget {
                records.remove(model);
            }
            for model in prune_stale(records, live) {
                debug!(model = %model, "Dropped stale container record");
            }
        })
        .await
    }

    /// Read-modify-write the record document under the store lock.
    ///
    /// Persistence failures are logged; the in-memory result is returned
    /// either way.
    async fn update_records<F>(&self, apply: F) -> BTreeMap<String, ContainerRecord>
    where
        F: FnOnce(&mut BTreeMap<String, ContainerRecord>),
    {
        let _guard = self.store_lock.lock().await;
        let mut records = self.load_records().await;
        let before = records.clone();
        apply(&mut records);
        if records != before {
            if let Err(e) = self.store.save(&records).await {
                warn!(error = %e, "Failed to persist container records");
            }
        }
        records
    }

    async fn load_records(&self) -> BTreeMap<String, ContainerRecord> {
        match self.store.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Container records unreadable, starting empty");
                BTreeMap::new()
            }
        }
    }
}

#[async_trait]
impl ServingBackend for ContainerOrchestrator {
    async fn ensure(&self, model: &str, path: &Path) -> Result<ContainerRecord> {
        ContainerOrchestrator::ensure(self, model, path).await
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainerState;

    fn record(model: &str, id: &str) -> ContainerRecord {
        ContainerRecord {
            model_name: model.into(),
            container_id: id.into(),
            container_name: format!("tf_{model}"),
            serving_endpoint: String::new(),
            status_endpoint: String::new(),
            host_port: None,
            created_at: Utc::now(),
        }
    }

    fn summary(id: &str, model: &str, state: ContainerState) -> ContainerSummary {
        ContainerSummary {
            id: id.into(),
            name: format!("tf_{model}"),
            state,
            model_name: Some(model.into()),
        }
    }

    #[test]
    fn sanitize_keeps_safe_names() {
        assert_eq!(sanitize_name("fire"), "fire");
        assert_eq!(sanitize_name("a.b_c-d"), "a.b_c-d");
    }

    #[test]
    fn sanitize_suffixes_rewritten_names() {
        let spaced = sanitize_name("my model");
        assert!(spaced.starts_with("my-model-"), "{spaced}");
        assert_eq!(spaced.len(), "my-model-".len() + 8);
        assert_ne!(spaced, sanitize_name("my-model"));
        assert_ne!(spaced, sanitize_name("my/model"));
        assert_eq!(spaced, sanitize_name("my model"));
        assert!(spaced
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
    }

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn prune_drops_missing_and_exited() {
        let mut records = BTreeMap::new();
        records.insert("alive".to_string(), record("alive", "aaa"));
        records.insert("exited".to_string(), record("exited", "bbb"));
        records.insert("gone".to_string(), record("gone", "ccc"));

        let live = vec![
            summary("aaa111", "alive", ContainerState::Running),
            summary("bbb222", "exited", ContainerState::Exited),
        ];
        let mut pruned = prune_stale(&mut records, &live);
        pruned.sort();

        assert_eq!(pruned, vec!["exited".to_string(), "gone".to_string()]);
        assert!(records.contains_key("alive"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn prune_drops_records_whose_container_serves_another_model() {
        let mut records = BTreeMap::new();
        records.insert("fire".to_string(), record("fire", "aaa"));

        let mut foreign = summary("aaa111", "fire", ContainerState::Running);
        foreign.model_name = Some("churn".into());
        assert_eq!(prune_stale(&mut records, &[foreign]), vec!["fire".to_string()]);

        records.insert("fire".to_string(), record("fire", "aaa"));
        let mut unlabelled = summary("aaa111", "fire", ContainerState::Running);
        unlabelled.model_name = None;
        assert_eq!(prune_stale(&mut records, &[unlabelled]), vec!["fire".to_string()]);
    }

    #[test]
    fn default_config_matches_serving_conventions() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.image, "tensorflow/serving:latest");
        assert_eq!(config.name_prefix, "tf_");
        assert_eq!(config.readiness_timeout, Duration::from_secs(60));
    }
}
